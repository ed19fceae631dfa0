pub mod degradation;
pub mod pick;
pub mod record;
