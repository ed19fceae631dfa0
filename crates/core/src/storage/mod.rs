pub mod advisor_outputs;

pub use advisor_outputs::PgRecordProvider;
