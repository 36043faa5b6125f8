//! Shadow table DDL generation.
//!
//! [`TableMaker`] generates the DDL for one live table, [`SchemaMaker`] for
//! every base table of a schema. Nothing is executed: the DDL is written to
//! the caller's sink for review.

use std::io::Write;

use provenance_core::{QualifiedName, ShadowTable};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::Result;

/// Default suffix of tables left out of schema generation.
pub const DEFAULT_EXCLUDE_SUFFIX: &str = "_history";

/// Generates shadow table DDL for single tables.
pub struct TableMaker<C> {
    catalog: C,
}

impl<C: Catalog> TableMaker<C> {
    /// Creates a table maker reading from `catalog`.
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Returns the underlying catalog.
    pub fn catalog_mut(&mut self) -> &mut C {
        &mut self.catalog
    }

    /// Derives the shadow table of a live table.
    pub async fn shadow_table(&mut self, name: &QualifiedName) -> Result<ShadowTable> {
        let definition = self.catalog.table_definition(name).await?;
        let table = ShadowTable::from_definition(name.clone(), &definition)?;
        info!(table = %name, columns = ?table.columns(), "Shadow table columns");
        Ok(table)
    }

    /// Writes the shadow table DDL and triggers for `name` (`table` or
    /// `schema.table`) to `out`.
    ///
    /// The DDL is written in a single call once the whole table is derived,
    /// so a failing table writes nothing.
    pub async fn create_table<W: Write + ?Sized>(
        &mut self,
        name: &str,
        out: &mut W,
    ) -> Result<QualifiedName> {
        let name = QualifiedName::parse(name)?;
        let table = self.shadow_table(&name).await?;
        out.write_all(table.to_sql().as_bytes())?;
        Ok(name)
    }
}

/// Generates shadow table DDL for a whole schema.
pub struct SchemaMaker<C> {
    tables: TableMaker<C>,
}

impl<C: Catalog> SchemaMaker<C> {
    /// Creates a schema maker reading from `catalog`.
    pub fn new(catalog: C) -> Self {
        Self {
            tables: TableMaker::new(catalog),
        }
    }

    /// Writes DDL for every base table of `schema` whose name does not end
    /// in `exclude_suffix`, in listing order. An empty suffix excludes
    /// nothing.
    ///
    /// Stops at the first failing table; DDL for earlier tables has already
    /// been written.
    pub async fn generate_schema<W: Write + ?Sized>(
        &mut self,
        schema: &str,
        exclude_suffix: &str,
        out: &mut W,
    ) -> Result<Vec<QualifiedName>> {
        let names = self.tables.catalog_mut().base_tables(schema).await?;
        debug!(schema = %schema, tables = %names.join(","), "Base tables");

        let mut generated = Vec::new();
        for table in names {
            if is_excluded(&table, exclude_suffix) {
                info!(schema = %schema, table = %table, suffix = %exclude_suffix, "Skipping excluded table");
                continue;
            }
            let name = QualifiedName::new(schema, table);
            let shadow = self.tables.shadow_table(&name).await?;
            out.write_all(shadow.to_sql().as_bytes())?;
            generated.push(name);
        }
        Ok(generated)
    }
}

fn is_excluded(table: &str, suffix: &str) -> bool {
    !suffix.is_empty() && table.ends_with(suffix)
}
