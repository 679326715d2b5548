/// Raw day jump applied by the calendar's previous/next controls.
pub const NAVIGATION_JUMP_DAYS: i64 = 30;

/// Maximum length of a daily message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 300;

/// Storage bucket holding memory images unless configured otherwise.
pub const DEFAULT_IMAGE_BUCKET: &str = "couple-images";

/// Horizontal release offset (px) past which the viewer changes slide.
pub const SWIPE_THRESHOLD_PX: f64 = 50.0;

/// Vertical release offset (px) past which the viewer closes.
pub const DISMISS_THRESHOLD_PX: f64 = 200.0;

pub const MIN_SCALE: f64 = 1.0;
pub const MAX_SCALE: f64 = 3.0;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Backend tables
pub const EVENTS_TABLE: &str = "events";
pub const MEMORIES_TABLE: &str = "memories";
pub const MEMORY_IMAGES_TABLE: &str = "memory_images";
pub const MESSAGES_TABLE: &str = "daily_messages";
