use mdb::connection::{ConnectionDriver, ConnectionState, TransportEvent};

#[test]
fn driver_runs_a_session_and_reconnects_after_failure() {
    let driver = ConnectionDriver::spawn();
    let events = [
        TransportEvent::Connect,
        TransportEvent::Established,
        TransportEvent::Failed("connection reset".into()),
        TransportEvent::Connect,
        TransportEvent::Established,
        TransportEvent::Disconnect,
        TransportEvent::Closed,
    ];
    for event in events {
        driver.send(event).unwrap();
    }

    let stats = driver.stop();
    assert_eq!(stats.applied, 7);
    assert_eq!(stats.rejected, 0);
    assert_eq!(stats.final_state, ConnectionState::Disconnected);
}

#[test]
fn dropping_the_driver_stops_it() {
    let driver = ConnectionDriver::spawn();
    driver.send(TransportEvent::Connect).unwrap();
    drop(driver);
}
