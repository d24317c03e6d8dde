//! Interactive search session: provider capabilities, the selection state
//! machine, an async driver and the presentation view model.

pub mod error;
pub mod navigator;
pub mod providers;
pub mod state;
pub mod view;

pub use error::{GeocodeError, GeolocationError, RoutingError, SessionError};
pub use navigator::Navigator;
pub use providers::{FixedPosition, Geocoder, PositionSource, Route, RouteProvider, TravelMode};
pub use state::{Effect, GeocodeTicket, GeolocationState, Notice, RouteTicket, Session};
pub use view::{
    maps_search_url, ListEntry, Marker, MarkerKind, Overlay, RouteView, SessionView,
};
