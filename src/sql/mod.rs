mod ddl;
mod dml;

/// Wraps `stmts` in a transaction serialized per database, schema and table.
///
/// Unquoted identifiers are folded to lower case by the server, so the lock
/// key is too: `Jobs.Inbox` and `jobs.inbox` are the same table.
fn locked<I>(schema: &str, table: &str, stmts: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let key = format!("{schema}.{table}").to_ascii_lowercase();
    format!(
        "
        BEGIN;
        SET LOCAL lock_timeout = '30s';
        SET LOCAL idle_in_transaction_session_timeout = '30s';
        SELECT pg_advisory_xact_lock(('x' || encode(sha224((current_database() || '.pgsqlmq.{key}')::bytea), 'hex'))::bit(64)::bigint);
        {};
        COMMIT;
        ",
        stmts.into_iter().collect::<Vec<_>>().join("\n"),
    )
}

///
/// \d pgsqlmq.messages
///```md
///          Table "pgsqlmq.messages"
///  Column  | Type | Collation | Nullable | Default
/// ---------+------+-----------+----------+---------
///  id      | uuid |           | not null |
///  payload | text |           | not null |
/// Indexes:
///     "messages_pkey" PRIMARY KEY, btree (id)
/// ```
///
fn install(schema: &str, table: &str) -> String {
    locked(
        schema,
        table,
        [
            ddl::create_schema(schema),
            ddl::create_message_table(schema, table),
        ],
    )
}

/// Statements compiled once per client for its schema and table.
#[derive(Debug, Clone)]
pub(crate) struct Statements {
    pub(crate) install: String,
    pub(crate) insert_message: String,
    pub(crate) notify: String,
    pub(crate) claim_one: String,
    pub(crate) delete_message: String,
    pub(crate) count_messages: String,
}

impl Statements {
    pub(crate) fn compile(schema: &str, table: &str) -> Self {
        Statements {
            install: install(schema, table),
            insert_message: dml::insert_message(schema, table),
            notify: dml::notify(),
            claim_one: dml::claim_one(schema, table),
            delete_message: dml::delete_message(schema, table),
            count_messages: dml::count_messages(schema, table),
        }
    }
}
