pub mod icons;
pub mod output;

pub use output::{
    error, format_datetime, format_priority, format_status, heading, info, panel, print_table,
    render_table, success, truncate, warning,
};
