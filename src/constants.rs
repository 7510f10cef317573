//! Layout constants and default values
//!
//! Every value is in graph units (unscaled, zoom 1.0).

/// Node body and layout constants
pub mod node {
    /// Width of every node
    pub const DEFAULT_WIDTH: f32 = 136.0;

    /// Height a node has before its sockets are laid out
    pub const DEFAULT_HEIGHT: f32 = 110.0;

    /// Padding added twice below the last socket for the collapsed size
    pub const Y_PADDING: f32 = 10.0;

    /// Padding around the thumbnail band (added twice to the expanded size)
    pub const THUMB_PADDING: f32 = 16.0;

    /// Side of the empty thumbnail a node starts with
    pub const EMPTY_THUMBNAIL_SIZE: usize = 120;

    /// Height of the header band
    pub const HEADER_HEIGHT: f32 = 12.0;

    /// Corner radius of the node body
    pub const BODY_ROUNDING: f32 = 3.0;

    /// Corner radius of the header band
    pub const HEADER_ROUNDING: f32 = 2.0;

    /// Horizontal offset of the node label from the left edge
    pub const LABEL_INSET: f32 = 10.0;
}

/// Socket placement constants
pub mod layout {
    /// Vertical position of the first socket
    pub const SOCKET_TOP_MARGIN: f32 = 40.0;

    /// Vertical distance between consecutive sockets
    pub const SOCKET_ROW_HEIGHT: f32 = 19.0;

    /// Horizontal inset of sockets from the node edge
    pub const SOCKET_SIDE_MARGIN: f32 = 0.0;

    /// Where the socket band ends for a single socket
    pub const SOCKET_BAND_START: f32 = 60.0;

    /// Growth of the socket band per additional socket
    pub const SOCKET_BAND_STEP: f32 = 12.0;
}

/// Socket drawing and interaction constants
pub mod socket {
    /// Radius of the drawn connector point
    pub const RADIUS: f32 = 5.0;

    /// Distance under which a pointer hits a socket. Not scaled by zoom.
    pub const HIT_RADIUS: f32 = 9.0;

    /// Gap between the connector point and its label
    pub const LABEL_MARGIN: f32 = 12.0;

    /// Label of the synthetic output socket
    pub const OUTPUT_LABEL: &str = "Output";

    /// Idname of the synthetic output socket
    pub const OUTPUT_IDNAME: &str = "Output";
}

/// Expand affordance constants
pub mod expand_icon {
    /// Side of the icon square
    pub const SIZE: f32 = 16.0;

    /// Distance of the icon's left edge from the node's right edge
    pub const RIGHT_OFFSET: f32 = 24.0;

    /// Distance of the icon's top edge from the node's top edge
    pub const TOP_OFFSET: f32 = 3.0;

    /// Margin the icon rect is grown by for hit testing
    pub const HIT_MARGIN: f32 = 8.0;

    /// Side of the pointer square tested against the icon
    pub const POINTER_SIZE: f32 = 2.0;
}

/// Environment and file names used by the configuration loader
pub mod config {
    /// Environment variable pointing at a style file
    pub const STYLE_ENV_VAR: &str = "NODECANVAS_STYLE";

    /// Directory under the platform config dir
    pub const APP_DIR: &str = "nodecanvas";

    /// Style file name inside [`APP_DIR`]
    pub const STYLE_FILE: &str = "style.json";
}
