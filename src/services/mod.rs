pub mod auth;
pub mod menu_service;
pub mod menu_tree;
pub mod publication_service;
pub mod staff_service;
