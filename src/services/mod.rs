pub mod buzz;
pub mod calendar;
pub mod competition;
pub mod opportunities;
pub mod random;
pub mod rankings;
pub mod report_service;
pub mod temporal;
pub mod viability;
