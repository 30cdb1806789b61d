pub mod errors;
pub mod db;

pub mod tenant;
pub mod currency;
pub mod code_group;
pub mod code;
pub mod customer;
pub mod employee;
pub mod product;
pub mod warehouse;
pub mod plan;
pub mod invoice;
pub mod purchase_order;
pub mod sales_order;
pub mod workflow;
pub mod workflow_step;
pub mod workflow_task;
