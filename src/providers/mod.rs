pub mod zenhub;
