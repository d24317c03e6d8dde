use nursemap_core::{FacilityId, SlotTable};

use super::*;

fn age(v: i64) -> AgeClass {
    AgeClass::try_from(v).unwrap()
}

fn facility(name: &str, lat: f64, lng: f64, vacancy_0: u32) -> Facility {
    let mut vacancy = SlotTable::default();
    vacancy.set(age(0), Some(vacancy_0));
    Facility {
        id: FacilityId(0),
        name: name.to_string(),
        address: format!("{name} address"),
        position: Point::new(lat, lng),
        evaluation_url: None,
        vacancy,
        capacity: SlotTable::default(),
    }
}

const HOME: Point = Point::new(35.561, 139.716);
const CLICK: Point = Point::new(35.575, 139.730);

fn session() -> Session {
    let dataset = Dataset::from_facilities(vec![
        facility("Alpha", 35.561, 139.716, 2),
        facility("Beta", 35.565, 139.720, 0),
        facility("Gamma", 35.562, 139.717, 1),
        facility("Delta", 35.575, 139.731, 3),
    ]);
    Session::new(dataset, SearchRadius::default())
}

fn names(session: &Session) -> Vec<&str> {
    session
        .ranked()
        .iter()
        .map(|r| r.facility.name.as_str())
        .collect()
}

fn route_to(point: Point) -> Route {
    Route {
        path: vec![HOME, Point::new(35.5615, 139.7165), point],
        distance_meters: Some(180.0),
        duration_secs: Some(140),
    }
}

/// Session with home known, age 0 selected, and Gamma routed and highlighted.
fn session_with_route() -> Session {
    let mut s = session();
    s.geolocation_acquired(HOME);
    s.set_age_class(Some(age(0)));
    let ticket = s.begin_route(1).unwrap();
    let destination = ticket.destination();
    let effect = s.complete_route(ticket, Ok(route_to(destination)));
    assert!(matches!(effect, Effect::RouteReady { .. }));
    assert!(s.selected().is_some());
    s
}

#[test]
fn new_session_is_empty() {
    let s = session();
    assert!(s.ranked().is_empty());
    assert!(s.active_point().is_none());
    assert_eq!(s.filter().radius.meters(), 700);
    assert!(s.filter().age_class.is_none());
    assert_eq!(s.geolocation(), GeolocationState::Pending);
}

#[test]
fn geolocation_without_age_does_not_rank() {
    let mut s = session();
    assert_eq!(s.geolocation_acquired(HOME), Effect::Unchanged);
    assert_eq!(s.home(), Some(HOME));
    assert!(s.ranked().is_empty());
}

#[test]
fn geolocation_with_age_ranks_around_home() {
    let mut s = session();
    s.set_age_class(Some(age(0)));
    assert_eq!(s.geolocation_acquired(HOME), Effect::Reranked { results: 2 });
    assert_eq!(names(&s), vec!["Alpha", "Gamma"]);
}

#[test]
fn geolocation_does_not_override_explicit_point() {
    let mut s = session();
    s.set_age_class(Some(age(0)));
    s.map_clicked(CLICK);
    assert_eq!(names(&s), vec!["Delta"]);
    assert_eq!(s.geolocation_acquired(HOME), Effect::Unchanged);
    assert_eq!(names(&s), vec!["Delta"]);
    assert_eq!(s.home(), Some(HOME));
}

#[test]
fn only_first_geolocation_fix_is_used() {
    let mut s = session();
    s.geolocation_acquired(HOME);
    assert_eq!(s.geolocation_acquired(CLICK), Effect::Unchanged);
    assert_eq!(s.home(), Some(HOME));
}

#[test]
fn geolocation_unavailable_leaves_no_home() {
    let mut s = session();
    let err = GeolocationError {
        reason: "permission denied".to_string(),
    };
    assert_eq!(s.geolocation_unavailable(&err), Effect::Unchanged);
    assert_eq!(s.geolocation(), GeolocationState::Unavailable);
    assert!(s.home().is_none());
    assert_eq!(s.return_home(), Effect::Unchanged);
}

#[test]
fn age_change_reranks_and_unset_empties() {
    let mut s = session();
    s.geolocation_acquired(HOME);
    assert_eq!(s.set_age_class(Some(age(0))), Effect::Reranked { results: 2 });
    assert_eq!(s.set_age_class(None), Effect::Reranked { results: 0 });
    assert!(s.ranked().is_empty());
}

#[test]
fn age_change_without_any_point_is_unchanged() {
    let mut s = session();
    assert_eq!(s.set_age_class(Some(age(0))), Effect::Unchanged);
    assert!(s.ranked().is_empty());
}

#[test]
fn radius_change_reranks_with_active_point() {
    let mut s = session();
    s.geolocation_acquired(HOME);
    s.set_age_class(Some(age(0)));
    assert_eq!(names(&s), vec!["Alpha", "Gamma"]);

    // Delta is ~2.5km from home, outside even the widest radius.
    let effect = s.set_radius(1500).unwrap();
    assert_eq!(effect, Effect::Reranked { results: 2 });
    assert_eq!(s.filter().radius.meters(), 1500);
}

#[test]
fn radius_change_without_age_is_unchanged() {
    let mut s = session();
    s.geolocation_acquired(HOME);
    assert_eq!(s.set_radius(300).unwrap(), Effect::Unchanged);
    assert_eq!(s.filter().radius.meters(), 300);
}

#[test]
fn invalid_radius_is_rejected_without_change() {
    let mut s = session();
    assert!(matches!(s.set_radius(100), Err(SessionError::Core(_))));
    assert_eq!(s.filter().radius.meters(), 700);
}

#[test]
fn map_click_always_ranks() {
    let mut s = session();
    assert_eq!(s.map_clicked(CLICK), Effect::Reranked { results: 0 });
    assert_eq!(s.explicit_point(), Some(CLICK));
    assert_eq!(s.active_point(), Some(CLICK));
}

#[test]
fn explicit_point_wins_over_home_for_radius_change() {
    let mut s = session();
    s.geolocation_acquired(HOME);
    s.set_age_class(Some(age(0)));
    s.map_clicked(CLICK);
    s.set_radius(300).unwrap();
    assert_eq!(names(&s), vec!["Delta"]);
}

#[test]
fn return_home_clears_explicit_point() {
    let mut s = session();
    s.geolocation_acquired(HOME);
    s.set_age_class(Some(age(0)));
    s.map_clicked(CLICK);
    assert_eq!(s.return_home(), Effect::Reranked { results: 2 });
    assert!(s.explicit_point().is_none());
    assert_eq!(names(&s), vec!["Alpha", "Gamma"]);
}

#[test]
fn return_home_without_home_is_noop() {
    let mut s = session();
    s.map_clicked(CLICK);
    assert_eq!(s.return_home(), Effect::Unchanged);
    assert_eq!(s.explicit_point(), Some(CLICK));
}

#[test]
fn geocode_success_sets_explicit_point_and_ranks() {
    let mut s = session();
    s.set_age_class(Some(age(0)));
    let ticket = s.begin_geocode("  池上4-5-2 ").unwrap();
    assert_eq!(ticket.query(), "池上4-5-2");
    assert_eq!(s.complete_geocode(ticket, Ok(CLICK)), Effect::Reranked { results: 1 });
    assert_eq!(s.explicit_point(), Some(CLICK));
}

#[test]
fn geocode_failure_changes_nothing() {
    let mut s = session();
    s.geolocation_acquired(HOME);
    s.set_age_class(Some(age(0)));
    s.map_clicked(HOME);
    let before = names(&s).iter().map(ToString::to_string).collect::<Vec<_>>();

    let ticket = s.begin_geocode("nowhere").unwrap();
    let effect = s.complete_geocode(
        ticket,
        Err(GeocodeError::NotFound {
            query: "nowhere".to_string(),
        }),
    );

    assert_eq!(
        effect,
        Effect::Notice(Notice::AddressNotFound {
            query: "nowhere".to_string()
        })
    );
    assert_eq!(s.explicit_point(), Some(HOME));
    assert_eq!(names(&s), before);
}

#[test]
fn geocode_provider_error_is_reported() {
    let mut s = session();
    let ticket = s.begin_geocode("池上").unwrap();
    let effect = s.complete_geocode(ticket, Err(GeocodeError::Provider("OVER_QUERY_LIMIT".into())));
    assert!(matches!(effect, Effect::Notice(Notice::GeocodeFailed { .. })));
    assert!(s.explicit_point().is_none());
}

#[test]
fn blank_geocode_query_is_rejected() {
    let mut s = session();
    assert!(matches!(s.begin_geocode("   "), Err(SessionError::EmptyAddress)));
}

#[test]
fn geocode_superseded_by_click_is_stale() {
    let mut s = session();
    let ticket = s.begin_geocode("池上").unwrap();
    s.map_clicked(CLICK);
    assert_eq!(s.complete_geocode(ticket, Ok(HOME)), Effect::Stale);
    assert_eq!(s.explicit_point(), Some(CLICK));
}

#[test]
fn older_geocode_is_stale_once_a_newer_one_is_issued() {
    let mut s = session();
    let first = s.begin_geocode("池上").unwrap();
    let second = s.begin_geocode("蒲田").unwrap();
    assert_eq!(s.complete_geocode(first, Ok(HOME)), Effect::Stale);
    assert_eq!(
        s.complete_geocode(second, Ok(CLICK)),
        Effect::Reranked { results: 0 }
    );
    assert_eq!(s.explicit_point(), Some(CLICK));
}

#[test]
fn route_success_selects_and_fits_bounds() {
    let mut s = session();
    s.geolocation_acquired(HOME);
    s.set_age_class(Some(age(0)));
    let ticket = s.begin_route(1).unwrap();
    assert_eq!(ticket.origin(), HOME);
    assert_eq!(ticket.facility().name, "Gamma");
    assert_eq!(ticket.mode(), TravelMode::Walking);

    let destination = ticket.destination();
    let effect = s.complete_route(ticket, Ok(route_to(destination)));
    let Effect::RouteReady { bounds } = effect else {
        panic!("expected RouteReady");
    };
    assert!(bounds.contains(HOME));
    assert!(bounds.contains(destination));
    assert_eq!(s.selected().map(|f| f.name.as_str()), Some("Gamma"));
    assert_eq!(s.route().map(|r| r.path.len()), Some(3));
}

#[test]
fn route_with_empty_path_fits_endpoints() {
    let mut s = session();
    s.geolocation_acquired(HOME);
    s.set_age_class(Some(age(0)));
    let ticket = s.begin_route(1).unwrap();
    let destination = ticket.destination();
    let empty = Route {
        path: Vec::new(),
        distance_meters: None,
        duration_secs: None,
    };
    let Effect::RouteReady { bounds } = s.complete_route(ticket, Ok(empty)) else {
        panic!("expected RouteReady");
    };
    assert_eq!(bounds.south_west, HOME);
    assert_eq!(bounds.north_east, destination);
}

#[test]
fn route_failure_changes_nothing() {
    let mut s = session();
    s.geolocation_acquired(HOME);
    s.set_age_class(Some(age(0)));
    let ticket = s.begin_route(0).unwrap();
    let effect = s.complete_route(ticket, Err(RoutingError::NoRoute));
    assert!(matches!(
        effect,
        Effect::Notice(Notice::RouteUnavailable { ref facility, .. }) if facility == "Alpha"
    ));
    assert!(s.selected().is_none());
    assert!(s.route().is_none());
}

#[test]
fn route_before_any_ranking_is_an_error() {
    let mut s = session();
    assert!(matches!(
        s.begin_route(0),
        Err(SessionError::NoSuchResult { index: 0, len: 0 })
    ));
}

#[test]
fn route_index_out_of_range_is_an_error() {
    let mut s = session();
    s.geolocation_acquired(HOME);
    s.set_age_class(Some(age(0)));
    assert!(matches!(
        s.begin_route(5),
        Err(SessionError::NoSuchResult { index: 5, len: 2 })
    ));
}

#[test]
fn ranking_pass_clears_selection_and_route() {
    let mut s = session_with_route();
    s.set_radius(900).unwrap();
    assert!(s.selected().is_none());
    assert!(s.route().is_none());

    let mut s = session_with_route();
    s.set_age_class(Some(age(1)));
    assert!(s.selected().is_none());
    assert!(s.route().is_none());

    let mut s = session_with_route();
    s.map_clicked(CLICK);
    assert!(s.selected().is_none());
    assert!(s.route().is_none());

    let mut s = session_with_route();
    s.map_clicked(CLICK);
    s.inspect(0).unwrap();
    s.return_home();
    assert!(s.selected().is_none());
}

#[test]
fn route_answer_after_rerank_is_stale() {
    let mut s = session();
    s.geolocation_acquired(HOME);
    s.set_age_class(Some(age(0)));
    let ticket = s.begin_route(0).unwrap();
    s.set_radius(500).unwrap();
    let destination = ticket.destination();
    assert_eq!(s.complete_route(ticket, Ok(route_to(destination))), Effect::Stale);
    assert!(s.selected().is_none());
    assert!(s.route().is_none());
}

#[test]
fn older_route_request_is_superseded() {
    let mut s = session();
    s.geolocation_acquired(HOME);
    s.set_age_class(Some(age(0)));
    let first = s.begin_route(0).unwrap();
    let second = s.begin_route(1).unwrap();
    let first_dest = first.destination();
    let second_dest = second.destination();
    assert!(matches!(
        s.complete_route(second, Ok(route_to(second_dest))),
        Effect::RouteReady { .. }
    ));
    assert_eq!(s.complete_route(first, Ok(route_to(first_dest))), Effect::Stale);
    assert_eq!(s.selected().map(|f| f.name.as_str()), Some("Gamma"));
}

#[test]
fn inspect_and_close_overlay() {
    let mut s = session();
    s.geolocation_acquired(HOME);
    s.set_age_class(Some(age(0)));
    assert_eq!(s.inspect(0).unwrap(), Effect::SelectionChanged);
    assert_eq!(s.selected().map(|f| f.name.as_str()), Some("Alpha"));
    assert!(s.route().is_none());
    assert_eq!(s.close_overlay(), Effect::SelectionChanged);
    assert!(s.selected().is_none());
    assert_eq!(s.close_overlay(), Effect::Unchanged);
    assert!(s.inspect(9).is_err());
}

#[test]
fn close_overlay_keeps_route() {
    let mut s = session_with_route();
    s.close_overlay();
    assert!(s.selected().is_none());
    assert!(s.route().is_some());
}

#[test]
fn notice_messages_name_the_subject() {
    let notice = Notice::RouteUnavailable {
        facility: "Alpha".to_string(),
        reason: "no walking route between the points".to_string(),
    };
    assert!(notice.to_string().contains("Alpha"));
    let notice = Notice::AddressNotFound {
        query: "池上".to_string(),
    };
    assert!(notice.to_string().contains("池上"));
}
