pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_school_tables;
mod m20250915_000001_create_academic_tables;
mod m20250920_000001_create_attendance_records;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_school_tables::Migration),
            Box::new(m20250915_000001_create_academic_tables::Migration),
            Box::new(m20250920_000001_create_attendance_records::Migration),
        ]
    }
}
