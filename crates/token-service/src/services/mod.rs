pub mod claims_service;
pub mod key_management_service;
pub mod refresh_token_service;
pub mod token_factory;
pub mod token_serializer;
pub mod token_service;
