// SQL schema for the review service database.

pub const INITIAL_SCHEMA: &str = include_str!("../../migrations/001_initial_schema.sql");
