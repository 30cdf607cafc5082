pub mod tooltip;

pub use tooltip::{Tooltip, TooltipContent, TooltipRow};
