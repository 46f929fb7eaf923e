pub(super) fn insert_message(schema: &str, table: &str) -> String {
    format!("INSERT INTO {schema}.{table} (id, payload) VALUES ($1, $2);")
}

// The channel is bound rather than interpolated, so `pg_notify` instead of `NOTIFY`.
pub(super) fn notify() -> String {
    "SELECT pg_notify($1, '');".to_string()
}

pub(super) fn claim_one(schema: &str, table: &str) -> String {
    format!(
        r#"
        SELECT id, payload FROM {schema}.{table}
        ORDER BY id ASC
        LIMIT 1
        FOR UPDATE
        SKIP LOCKED;
        "#
    )
}

pub(super) fn delete_message(schema: &str, table: &str) -> String {
    format!("DELETE FROM {schema}.{table} WHERE id = $1;")
}

pub(super) fn count_messages(schema: &str, table: &str) -> String {
    format!("SELECT COUNT(*) FROM {schema}.{table};")
}
