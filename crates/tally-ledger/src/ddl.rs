use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, Statement, TransactionTrait,
};
use sea_orm_migration::SchemaManager;
use sea_orm_migration::sea_query::{
    Alias, ColumnDef, Expr, Query, Table, TableAlterStatement, TableCreateStatement,
};

use crate::state::EntityShape;
use crate::types::{FieldDefault, FieldSpec, FieldType};

pub(crate) fn column_def(backend: DatabaseBackend, name: &str, spec: &FieldSpec) -> ColumnDef {
    let mut col = ColumnDef::new(Alias::new(name));
    match &spec.kind {
        FieldType::AutoId => {
            // SQLite only auto-increments an INTEGER PRIMARY KEY.
            match backend {
                DatabaseBackend::Sqlite => col.integer(),
                _ => col.big_integer(),
            };
            col.not_null().auto_increment().primary_key();
            return col;
        }
        FieldType::Char { max_length } => {
            col.string_len(*max_length);
        }
        FieldType::Text => {
            col.text();
        }
        FieldType::Boolean => {
            col.boolean();
        }
        FieldType::Integer => {
            col.integer();
        }
        FieldType::DateTime => {
            col.timestamp_with_time_zone();
        }
        FieldType::Json => {
            col.json();
        }
    }

    if spec.null {
        col.null();
    } else {
        col.not_null();
    }
    if spec.unique {
        col.unique_key();
    }
    if let Some(default) = &spec.default {
        match default {
            FieldDefault::Bool(v) => col.default(*v),
            FieldDefault::Int(v) => col.default(*v),
            FieldDefault::Str(v) => col.default(v.clone()),
            FieldDefault::EmptyList => col.default("[]"),
            FieldDefault::Now => col.default(Expr::current_timestamp()),
        };
    }
    col
}

pub(crate) fn create_table(
    backend: DatabaseBackend,
    name: &str,
    fields: &[(String, FieldSpec)],
) -> TableCreateStatement {
    let mut stmt = Table::create();
    stmt.table(Alias::new(name));
    for (field, spec) in fields {
        stmt.col(column_def(backend, field, spec));
    }
    stmt
}

pub(crate) fn add_column(
    backend: DatabaseBackend,
    entity: &str,
    field: &str,
    spec: &FieldSpec,
) -> TableAlterStatement {
    Table::alter()
        .table(Alias::new(entity))
        .add_column(column_def(backend, field, spec))
        .to_owned()
}

/// In-place column change for backends that support `ALTER COLUMN`.
/// Uniqueness is not part of the statement; see [`alter_column`].
pub(crate) fn modify_column(
    backend: DatabaseBackend,
    entity: &str,
    field: &str,
    next: &FieldSpec,
) -> TableAlterStatement {
    let mut spec = next.clone();
    spec.unique = false;
    Table::alter()
        .table(Alias::new(entity))
        .modify_column(column_def(backend, field, &spec))
        .to_owned()
}

/// Statements that move one column from `previous` to `next` in place.
///
/// `ALTER COLUMN` only adds properties, so a removed default and a removed
/// unique constraint are dropped explicitly. The unique constraint carries
/// Postgres' default name `<table>_<column>_key`, which is also the name a
/// column-level `UNIQUE` receives at table creation.
pub(crate) fn alter_column(
    backend: DatabaseBackend,
    entity: &str,
    field: &str,
    previous: &FieldSpec,
    next: &FieldSpec,
) -> Vec<Statement> {
    let table = quote(backend, entity);
    let column = quote(backend, field);
    let constraint = quote(backend, &format!("{entity}_{field}_key"));

    let mut statements = vec![backend.build(&modify_column(backend, entity, field, next))];
    if previous.default.is_some() && next.default.is_none() {
        statements.push(Statement::from_string(
            backend,
            format!("ALTER TABLE {table} ALTER COLUMN {column} DROP DEFAULT"),
        ));
    }
    if next.unique && !previous.unique {
        statements.push(Statement::from_string(
            backend,
            format!("ALTER TABLE {table} ADD CONSTRAINT {constraint} UNIQUE ({column})"),
        ));
    }
    if previous.unique && !next.unique {
        let drop = match backend {
            DatabaseBackend::MySql => format!("ALTER TABLE {table} DROP INDEX {constraint}"),
            _ => format!("ALTER TABLE {table} DROP CONSTRAINT {constraint}"),
        };
        statements.push(Statement::from_string(backend, drop));
    }
    statements
}

fn quote(backend: DatabaseBackend, ident: &str) -> String {
    match backend {
        DatabaseBackend::MySql => format!("`{}`", ident.replace('`', "``")),
        _ => format!("\"{}\"", ident.replace('"', "\"\"")),
    }
}

/// Replace `entity` with a table of the new `shape`, keeping its rows.
///
/// SQLite cannot modify a column, so the table is rebuilt: create the new
/// shape under a scratch name, copy the rows, drop the old table and rename.
/// All four steps share one transaction.
pub(crate) async fn rebuild_table(
    db: &DatabaseConnection,
    entity: &str,
    shape: &EntityShape,
) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let scratch = format!("{entity}__rebuild");
    let columns: Vec<Alias> = shape.column_names().map(Alias::new).collect();

    let copy = Query::insert()
        .into_table(Alias::new(&scratch))
        .columns(columns.clone())
        .select_from(
            Query::select()
                .columns(columns)
                .from(Alias::new(entity))
                .to_owned(),
        )
        .map_err(|e| DbErr::Custom(format!("build copy statement: {e}")))?
        .to_owned();

    let txn = db.begin().await?;
    {
        let manager = SchemaManager::new(&txn);
        manager
            .create_table(create_table(backend, &scratch, &shape.fields))
            .await?;
        txn.execute(backend.build(&copy)).await?;
        manager
            .drop_table(Table::drop().table(Alias::new(entity)).to_owned())
            .await?;
        manager
            .rename_table(
                Table::rename()
                    .table(Alias::new(&scratch), Alias::new(entity))
                    .to_owned(),
            )
            .await?;
    }
    txn.commit().await
}
