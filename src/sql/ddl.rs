pub(super) fn create_schema(schema: &str) -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {};", schema)
}

/// Messages are keyed by a time-ordered UUID, so the primary key index
/// doubles as the claim order.
pub(super) fn create_message_table(schema: &str, table: &str) -> String {
    format!(
        "
        CREATE TABLE IF NOT EXISTS {schema}.{table} (
            id uuid not null,
            payload text not null,
            CONSTRAINT {table}_pkey PRIMARY KEY (id)
        );
        "
    )
}
