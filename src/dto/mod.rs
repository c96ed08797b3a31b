pub mod qr;
pub mod sync;
