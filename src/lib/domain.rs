//! Domain logic, independent of any particular mail transport.

pub mod communication;
