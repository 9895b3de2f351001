use epg_core::Programme;
use sqlx::{PgConnection, Postgres, QueryBuilder};

use crate::store::{ReplaceOutcome, TableName};

/// Rows per INSERT statement. Five binds per row keeps each statement under
/// the Postgres limit of 65535 bind parameters.
pub const INSERT_CHUNK_ROWS: usize = 10_000;

/// Statements that replace every stored programme of one channel.
#[derive(Debug)]
pub struct ReplacePlan<'a> {
    table: &'a TableName,
    channel: &'a str,
    chunks: Vec<&'a [Programme]>,
}

impl<'a> ReplacePlan<'a> {
    pub fn new(table: &'a TableName, channel: &'a str, programmes: &'a [Programme]) -> Self {
        Self {
            table,
            channel,
            chunks: programmes.chunks(INSERT_CHUNK_ROWS).collect(),
        }
    }

    pub fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE channel = $1", self.table)
    }

    /// Number of INSERT statements; zero when there is nothing to insert.
    pub fn insert_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn insert_statements(&self) -> impl Iterator<Item = QueryBuilder<'a, Postgres>> + '_ {
        self.chunks
            .iter()
            .copied()
            .map(|rows| insert_builder(self.table, self.channel, rows))
    }

    /// Runs the delete and all inserts on `conn`. The caller owns the
    /// transaction boundary.
    pub async fn execute(&self, conn: &mut PgConnection) -> Result<ReplaceOutcome, sqlx::Error> {
        let delete_sql = self.delete_sql();
        let deleted = sqlx::query(&delete_sql)
            .bind(self.channel)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        let mut inserted = 0;
        for mut statement in self.insert_statements() {
            inserted += statement.build().execute(&mut *conn).await?.rows_affected();
        }

        Ok(ReplaceOutcome { deleted, inserted })
    }
}

/// Multi-row insert. Every row is written under `channel`.
fn insert_builder<'a>(
    table: &TableName,
    channel: &'a str,
    rows: &'a [Programme],
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "INSERT INTO {} (start, stop, title, channel, description) ",
        table
    ));
    qb.push_values(rows, |mut b, p| {
        b.push_bind(p.start)
            .push_bind(p.stop)
            .push_bind(p.title.as_str())
            .push_bind(channel)
            .push_bind(p.description.as_str());
    });
    qb
}
