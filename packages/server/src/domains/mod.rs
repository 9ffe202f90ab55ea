// Business domains
pub mod approvers;
pub mod calendar;
pub mod classification;
pub mod events;
pub mod members;
pub mod scraping;
pub mod source;
