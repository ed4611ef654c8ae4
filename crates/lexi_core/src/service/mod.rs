//! Use-case services over the repository layer.

pub mod topic_service;
