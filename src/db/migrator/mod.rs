use sea_orm_migration::prelude::*;

mod m20240101_initial;
mod m20240115_add_users;
mod m20240201_add_reports;
mod m20240301_add_view_counts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_initial::Migration),
            Box::new(m20240115_add_users::Migration),
            Box::new(m20240201_add_reports::Migration),
            Box::new(m20240301_add_view_counts::Migration),
        ]
    }
}
