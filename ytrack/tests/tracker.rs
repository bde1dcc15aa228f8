mod helpers;

#[path = "tracker/pipeline.rs"]
mod pipeline;

#[path = "tracker/isolation.rs"]
mod isolation;

#[path = "tracker/cycles.rs"]
mod cycles;

#[path = "tracker/dumps.rs"]
mod dumps;

#[path = "tracker/csv_end_to_end.rs"]
mod csv_end_to_end;
