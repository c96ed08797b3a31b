// Each module describes the tables of one store file. The three catalog
// stores share the `catalog` layout.

pub mod personnel {
    diesel::table! {
        employees (id) {
            id -> Integer,
            national_id -> Text,
            full_name -> Text,
            phone -> Nullable<Text>,
            email -> Nullable<Text>,
            address -> Nullable<Text>,
            hire_date -> Nullable<Date>,
            work_area -> Nullable<Text>,
            role -> Nullable<Text>,
            base_salary -> Nullable<BigInt>,
            active -> Bool,
            created_at -> Timestamp,
        }
    }

    diesel::table! {
        attendance (id) {
            id -> Integer,
            employee_id -> Integer,
            work_date -> Date,
            entry_at -> Nullable<Timestamp>,
            exit_at -> Nullable<Timestamp>,
            last_action -> Text,
            token -> Nullable<Text>,
            ip_address -> Nullable<Text>,
            user_agent -> Nullable<Text>,
            updated_at -> Timestamp,
        }
    }

    diesel::table! {
        daily_tokens (id) {
            id -> Integer,
            token -> Text,
            issued_on -> Date,
            expires_at -> Timestamp,
            active -> Bool,
        }
    }

    diesel::table! {
        contracts (id) {
            id -> Integer,
            employee_id -> Integer,
            contract_type -> Text,
            start_date -> Date,
            end_date -> Nullable<Date>,
            salary -> Nullable<BigInt>,
            active -> Bool,
            created_at -> Timestamp,
        }
    }

    diesel::joinable!(attendance -> employees (employee_id));
    diesel::joinable!(contracts -> employees (employee_id));

    diesel::allow_tables_to_appear_in_same_query!(attendance, contracts, daily_tokens, employees,);
}

pub mod catalog {
    diesel::table! {
        products (id) {
            id -> Integer,
            code -> Text,
            name -> Text,
            unit -> Text,
            unit_value -> Double,
            balance -> Integer,
            min_stock -> Integer,
            location -> Nullable<Text>,
            supplier -> Nullable<Text>,
            active -> Bool,
            hazard_level -> Nullable<Text>,
            active_ingredient -> Nullable<Text>,
            concentration -> Nullable<Text>,
            registration_number -> Nullable<Text>,
            expiration_date -> Nullable<Date>,
            batch -> Nullable<Text>,
            category -> Nullable<Text>,
            product_type -> Nullable<Text>,
            created_at -> Timestamp,
            updated_at -> Timestamp,
        }
    }

    diesel::table! {
        movements (id) {
            id -> Integer,
            product_code -> Text,
            product_name -> Text,
            kind -> Text,
            quantity -> Integer,
            moved_at -> Timestamp,
            balance_before -> Integer,
            balance_after -> Integer,
            responsible -> Text,
            notes -> Nullable<Text>,
        }
    }

    diesel::allow_tables_to_appear_in_same_query!(movements, products,);
}

pub mod alerts {
    diesel::table! {
        alerts (id) {
            id -> Integer,
            kind -> Text,
            severity -> Text,
            title -> Text,
            message -> Text,
            source_catalog -> Text,
            source_key -> Text,
            created_at -> Timestamp,
            resolved_at -> Nullable<Timestamp>,
            active -> Bool,
            payload -> Text,
        }
    }

    diesel::table! {
        alert_history (id) {
            id -> Integer,
            alert_id -> Integer,
            action -> Text,
            actor -> Nullable<Text>,
            notes -> Nullable<Text>,
            recorded_at -> Timestamp,
        }
    }

    diesel::joinable!(alert_history -> alerts (alert_id));

    diesel::allow_tables_to_appear_in_same_query!(alert_history, alerts,);
}
