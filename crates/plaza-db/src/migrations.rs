use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use plaza_types::schema::{ALL_TABLES, ColumnDef, ColumnDefault, ColumnType, OnDelete, TableSchema};

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");

        let mut sql = String::new();
        for table in ALL_TABLES {
            sql.push_str(&create_table_sql(table));
            sql.push_str(";\n\n");
        }
        sql.push_str(
            "
            CREATE INDEX IF NOT EXISTS idx_posts_created
                ON posts(created_at);

            CREATE INDEX IF NOT EXISTS idx_posts_author
                ON posts(author);

            CREATE INDEX IF NOT EXISTS idx_comments_post
                ON comments(post_id, created_at);

            CREATE INDEX IF NOT EXISTS idx_likes_post
                ON likes(post_id);

            CREATE INDEX IF NOT EXISTS idx_tips_post
                ON tips(post_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        );

        conn.execute_batch(&format!("BEGIN;\n{}\nCOMMIT;", sql))?;
    }

    info!("Database migrations complete");
    Ok(())
}

/// Render a table declaration as a SQLite `CREATE TABLE` statement.
pub fn create_table_sql(table: &TableSchema) -> String {
    let mut lines: Vec<String> = table.columns.iter().map(column_sql).collect();
    for group in table.unique_together {
        lines.push(format!("UNIQUE({})", group.join(", ")));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        table.name,
        lines.join(",\n    ")
    )
}

fn column_sql(column: &ColumnDef) -> String {
    let sql_type = match column.ty {
        ColumnType::Integer => "INTEGER",
        ColumnType::Id | ColumnType::Text | ColumnType::Amount | ColumnType::Timestamp => "TEXT",
    };

    let mut sql = format!("{} {}", column.name, sql_type);
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if column.primary_key {
        sql.push_str(" PRIMARY KEY");
    }
    if column.unique {
        sql.push_str(" UNIQUE");
    }

    match column.default {
        Some(ColumnDefault::Integer(n)) => sql.push_str(&format!(" DEFAULT {}", n)),
        Some(ColumnDefault::Amount(a)) => sql.push_str(&format!(" DEFAULT '{}'", a)),
        Some(ColumnDefault::Now) => sql.push_str(" DEFAULT (datetime('now'))"),
        None => {}
    }

    if let Some(fk) = column.references {
        let on_delete = match fk.on_delete {
            OnDelete::Restrict => "RESTRICT",
        };
        sql.push_str(&format!(
            " REFERENCES {}({}) ON DELETE {}",
            fk.table, fk.column, on_delete
        ));
    }

    sql
}
