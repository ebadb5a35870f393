// src/handlers/mod.rs

pub mod auth;
pub mod menus;
pub mod publications;
pub mod rbac;
pub mod staff;
