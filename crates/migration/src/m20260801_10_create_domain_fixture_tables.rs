use sea_orm_migration::{
  prelude::*,
  schema::{date, double, pk_uuid, string, uuid, uuid_null},
};

/// Local fixture for the external "business database" the domain augmentation
/// component reads from (§6). A real deployment points at a separately owned,
/// read-only schema; this migration exists only so the crate's tests and
/// local development have something to query against.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(DomainCustomer::Table)
          .if_not_exists()
          .col(pk_uuid(DomainCustomer::Id))
          .col(string(DomainCustomer::Name))
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(DomainSalesOrder::Table)
          .if_not_exists()
          .col(pk_uuid(DomainSalesOrder::Id))
          .col(string(DomainSalesOrder::OrderNumber))
          .col(uuid(DomainSalesOrder::CustomerId))
          .col(string(DomainSalesOrder::Status))
          .col(date(DomainSalesOrder::CreatedAt))
          .foreign_key(
            ForeignKey::create()
              .from(DomainSalesOrder::Table, DomainSalesOrder::CustomerId)
              .to(DomainCustomer::Table, DomainCustomer::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(DomainWorkOrder::Table)
          .if_not_exists()
          .col(pk_uuid(DomainWorkOrder::Id))
          .col(uuid(DomainWorkOrder::SalesOrderId))
          .col(string(DomainWorkOrder::Status))
          .col(date(DomainWorkOrder::CreatedAt))
          .foreign_key(
            ForeignKey::create()
              .from(DomainWorkOrder::Table, DomainWorkOrder::SalesOrderId)
              .to(DomainSalesOrder::Table, DomainSalesOrder::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(DomainInvoice::Table)
          .if_not_exists()
          .col(pk_uuid(DomainInvoice::Id))
          .col(string(DomainInvoice::InvoiceNumber))
          .col(uuid(DomainInvoice::SalesOrderId))
          .col(uuid(DomainInvoice::CustomerId))
          .col(double(DomainInvoice::Amount))
          .col(string(DomainInvoice::Status))
          .col(date(DomainInvoice::DueDate))
          .foreign_key(
            ForeignKey::create()
              .from(DomainInvoice::Table, DomainInvoice::SalesOrderId)
              .to(DomainSalesOrder::Table, DomainSalesOrder::Id),
          )
          .foreign_key(
            ForeignKey::create()
              .from(DomainInvoice::Table, DomainInvoice::CustomerId)
              .to(DomainCustomer::Table, DomainCustomer::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(DomainPayment::Table)
          .if_not_exists()
          .col(pk_uuid(DomainPayment::Id))
          .col(uuid(DomainPayment::InvoiceId))
          .col(double(DomainPayment::Amount))
          .col(date(DomainPayment::PaidAt))
          .foreign_key(
            ForeignKey::create()
              .from(DomainPayment::Table, DomainPayment::InvoiceId)
              .to(DomainInvoice::Table, DomainInvoice::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(DomainTask::Table)
          .if_not_exists()
          .col(pk_uuid(DomainTask::Id))
          .col(uuid(DomainTask::CustomerId))
          .col(uuid_null(DomainTask::SalesOrderId))
          .col(string(DomainTask::Description))
          .col(string(DomainTask::Status))
          .col(date(DomainTask::CreatedAt))
          .foreign_key(
            ForeignKey::create()
              .from(DomainTask::Table, DomainTask::CustomerId)
              .to(DomainCustomer::Table, DomainCustomer::Id),
          )
          .to_owned(),
      )
      .await?;

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(DomainTask::Table).to_owned()).await?;
    manager.drop_table(Table::drop().table(DomainPayment::Table).to_owned()).await?;
    manager.drop_table(Table::drop().table(DomainInvoice::Table).to_owned()).await?;
    manager.drop_table(Table::drop().table(DomainWorkOrder::Table).to_owned()).await?;
    manager.drop_table(Table::drop().table(DomainSalesOrder::Table).to_owned()).await?;
    manager.drop_table(Table::drop().table(DomainCustomer::Table).to_owned()).await?;
    Ok(())
  }
}

#[derive(Iden)]
pub enum DomainCustomer {
  Table,
  Id,
  Name,
}

#[derive(Iden)]
pub enum DomainSalesOrder {
  Table,
  Id,
  OrderNumber,
  CustomerId,
  Status,
  CreatedAt,
}

#[derive(Iden)]
pub enum DomainWorkOrder {
  Table,
  Id,
  SalesOrderId,
  Status,
  CreatedAt,
}

#[derive(Iden)]
pub enum DomainInvoice {
  Table,
  Id,
  InvoiceNumber,
  SalesOrderId,
  CustomerId,
  Amount,
  Status,
  DueDate,
}

#[derive(Iden)]
pub enum DomainPayment {
  Table,
  Id,
  InvoiceId,
  Amount,
  PaidAt,
}

#[derive(Iden)]
pub enum DomainTask {
  Table,
  Id,
  CustomerId,
  SalesOrderId,
  Description,
  Status,
  CreatedAt,
}
