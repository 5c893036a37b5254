//! Core business logic services

pub mod airport_repository;
pub mod airport_service;
pub mod airport_sync;
pub mod airport_validator;
pub mod airport_weather;
pub mod cache_store;
pub mod source_client;
pub mod weather_service;

#[cfg(test)]
pub mod test_support;
