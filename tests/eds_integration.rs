// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the EDS backend using wiremock.

#![cfg(feature = "eds")]

use std::sync::Arc;

use owbridge::access::AttributeAccess;
use owbridge::event::DeviceEvent;
use owbridge::history::MemoryHistory;
use owbridge::manager::{Bridge, DeviceDescriptor, DeviceKind, PollOutcome};
use owbridge::protocol::{Adapter, EdsAdapter};
use owbridge::types::{
    Attribute, AttributeValue, CurrentHumidifierState, DeviceAddress, RelayControl,
};
use owbridge::{Error, FetchError, ParseError, WriteError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const THERMOMETER: &str = "5F0000000A7B1C28";
const HUMIDISTAT: &str = "7E0000001C3C5D28";

fn details(humidistat_fields: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Devices-Detail-Response xmlns="http://www.embeddeddatasystems.com/schema/owserver">
  <PollCount>4711</PollCount>
  <DevicesConnected>2</DevicesConnected>
  <owd_DS18B20 Description="Programmable resolution thermometer">
    <Name>DS18B20</Name>
    <Family>28</Family>
    <ROMId>{THERMOMETER}</ROMId>
    <Health>7</Health>
    <Temperature Units="Fahrenheit">212.0</Temperature>
  </owd_DS18B20>
  <owd_EDS0065 Description="Temperature and Humidity Sensor">
    <Name>EDS0065</Name>
    <ROMId>{HUMIDISTAT}</ROMId>
    {humidistat_fields}
  </owd_EDS0065>
</Devices-Detail-Response>"#
    )
}

const HUMIDIFYING: &str = r#"
    <Temperature Units="Centigrade">37.5</Temperature>
    <Humidity Units="PercentRelativeHumidity">35.4</Humidity>
    <Humidex Units="Centigrade">44.2</Humidex>
    <RelayFunction>1</RelayFunction>
    <RelayState>1</RelayState>
    <TemperatureHighAlarmState>0</TemperatureHighAlarmState>
    <HumidityLowAlarmState>1</HumidityLowAlarmState>
    <HumidityLowAlarmValue>40</HumidityLowAlarmValue>
    <LEDFunction>1</LEDFunction>"#;

async fn mount_details(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/details.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn bridge_for(server: &MockServer) -> Bridge<EdsAdapter> {
    let bridge = Bridge::new(EdsAdapter::new(server.uri()).unwrap());
    bridge
        .register(DeviceDescriptor::new(THERMOMETER, DeviceKind::Ds18b20).with_name("Attic"))
        .await;
    bridge
        .register(DeviceDescriptor::new(HUMIDISTAT, DeviceKind::Eds0065Humidistat))
        .await;
    bridge
}

// ============================================================================
// Adapter
// ============================================================================

mod adapter {
    use super::*;

    #[tokio::test]
    async fn read_converts_units_and_rounds() {
        let server = MockServer::start().await;
        mount_details(&server, details(HUMIDIFYING)).await;

        let adapter = EdsAdapter::new(server.uri()).unwrap();
        let devices = [
            DeviceDescriptor::new(THERMOMETER, DeviceKind::Ds18b20),
            DeviceDescriptor::new(HUMIDISTAT, DeviceKind::Eds0065Humidistat),
        ];
        let readings = adapter.read(&devices).await.unwrap();

        let thermometer = &readings[&DeviceAddress::new(THERMOMETER)];
        assert_eq!(thermometer.temperature(), Some(100.0));

        let humidistat = &readings[&DeviceAddress::new(HUMIDISTAT)];
        assert_eq!(humidistat.temperature(), Some(37.5));
        assert_eq!(humidistat.humidity(), Some(35.0));
        assert_eq!(humidistat.humidex(), Some(44.0));
        assert_eq!(humidistat.relay_control(), Some(RelayControl::AutoOn));
        assert_eq!(humidistat.relay_state(), Some(true));
        assert_eq!(humidistat.alarm_state(), Some(true));
        assert_eq!(humidistat.threshold(), Some(40));
    }

    #[tokio::test]
    async fn server_error_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/details.xml"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let adapter = EdsAdapter::new(server.uri()).unwrap();
        let err = adapter.read(&[]).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::Status(503))));
    }

    #[tokio::test]
    async fn html_page_is_parse_error() {
        let server = MockServer::start().await;
        mount_details(&server, "<html><body>Login</body></html>".to_string()).await;

        let adapter = EdsAdapter::new(server.uri()).unwrap();
        let err = adapter.read(&[]).await.unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::UnexpectedFormat(_))));
    }

    #[tokio::test]
    async fn write_sends_rom_variable_and_value() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/devices.htm"))
            .and(query_param("rom", HUMIDISTAT))
            .and(query_param("variable", "RelayFunction"))
            .and(query_param("value", "3"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = EdsAdapter::new(server.uri()).unwrap();
        let device = DeviceDescriptor::new(HUMIDISTAT, DeviceKind::Eds0065Humidistat);
        adapter
            .write(&device, Attribute::RelayControl, RelayControl::Off.into())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn write_rejected_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/devices.htm"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let adapter = EdsAdapter::new(server.uri()).unwrap();
        let device = DeviceDescriptor::new(HUMIDISTAT, DeviceKind::Eds0065Humidistat);
        let err = adapter
            .write(&device, Attribute::Threshold, AttributeValue::Int(45))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Write(WriteError::Status(404))));
    }

    #[tokio::test]
    async fn write_of_sensor_attribute_is_unsupported() {
        let server = MockServer::start().await;
        let adapter = EdsAdapter::new(server.uri()).unwrap();
        let device = DeviceDescriptor::new(THERMOMETER, DeviceKind::Ds18b20);

        let err = adapter
            .write(&device, Attribute::Temperature, AttributeValue::Float(20.0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedAttribute(Attribute::Temperature)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}

// ============================================================================
// Bridge over EDS
// ============================================================================

mod bridge {
    use super::*;

    #[tokio::test]
    async fn poll_derives_humidistat_state_and_logs_history() {
        let server = MockServer::start().await;
        mount_details(&server, details(HUMIDIFYING)).await;

        let history = Arc::new(MemoryHistory::new());
        let bridge = bridge_for(&server).await.with_history(history.clone());

        let outcome = bridge.poll_once().await.unwrap();
        assert!(matches!(
            outcome,
            PollOutcome::Completed { devices: 2, problems: 0, .. }
        ));

        let state = bridge.state(&HUMIDISTAT.into()).await.unwrap();
        assert_eq!(state.current_state(), Some(CurrentHumidifierState::Humidifying));
        assert_eq!(state.active(), Some(true));

        // Only the thermometer feeds a logger.
        let records = history.entries(&THERMOMETER.into());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].temp, Some(100.0));
        assert!(history.entries(&HUMIDISTAT.into()).is_empty());
    }

    #[tokio::test]
    async fn parse_failure_changes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/details.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(details(HUMIDIFYING)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/details.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<Devices-Detail-Response><owd_DS18B20><ROMId>5F"),
            )
            .mount(&server)
            .await;

        let bridge = bridge_for(&server).await;
        bridge.poll_once().await.unwrap();
        let before_thermometer = bridge.state(&THERMOMETER.into()).await.unwrap();
        let before_humidistat = bridge.state(&HUMIDISTAT.into()).await.unwrap();

        let mut events = bridge.subscribe();
        let err = bridge.poll_once().await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));

        assert_eq!(bridge.state(&THERMOMETER.into()).await.unwrap(), before_thermometer);
        assert_eq!(bridge.state(&HUMIDISTAT.into()).await.unwrap(), before_humidistat);
        assert!(matches!(
            events.recv().await.unwrap(),
            DeviceEvent::PollFailed { .. }
        ));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn turning_off_writes_relay_and_led() {
        let server = MockServer::start().await;
        mount_details(&server, details(HUMIDIFYING)).await;
        Mock::given(method("GET"))
            .and(path("/devices.htm"))
            .and(query_param("variable", "RelayFunction"))
            .and(query_param("value", "3"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/devices.htm"))
            .and(query_param("variable", "LEDFunction"))
            .and(query_param("value", "3"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let bridge = bridge_for(&server).await;
        bridge.poll_once().await.unwrap();

        let humidistat = bridge.handle(HUMIDISTAT);
        humidistat
            .set_attribute(Attribute::Active, false.into())
            .await
            .unwrap();

        assert_eq!(
            humidistat.get_attribute(Attribute::Active).await.unwrap(),
            AttributeValue::Bool(false)
        );
    }

    #[tokio::test]
    async fn thermometer_ignores_active_and_target_state() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/devices.htm"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let bridge = bridge_for(&server).await;
        let thermometer = bridge.handle(THERMOMETER);
        thermometer
            .set_attribute(Attribute::Active, true.into())
            .await
            .unwrap();
        thermometer
            .set_attribute(Attribute::TargetState, AttributeValue::Int(2))
            .await
            .unwrap();

        let err = thermometer
            .get_attribute(Attribute::TargetState)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotAvailable { .. }));
    }

    #[tokio::test]
    async fn failed_led_write_is_not_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/devices.htm"))
            .and(query_param("variable", "RelayFunction"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/devices.htm"))
            .and(query_param("variable", "LEDFunction"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let bridge = bridge_for(&server).await;
        let humidistat = bridge.handle(HUMIDISTAT);
        humidistat
            .set_attribute(Attribute::Active, true.into())
            .await
            .unwrap();

        assert_eq!(
            humidistat.get_attribute(Attribute::Active).await.unwrap(),
            AttributeValue::Bool(true)
        );
    }

    #[tokio::test]
    async fn failed_relay_write_is_surfaced_and_state_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/devices.htm"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let bridge = bridge_for(&server).await;
        let humidistat = bridge.handle(HUMIDISTAT);
        let err = humidistat
            .set_attribute(Attribute::Active, true.into())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Write(WriteError::Status(500))));

        let err = humidistat.get_attribute(Attribute::Active).await.unwrap_err();
        assert!(matches!(err, Error::NotAvailable { .. }));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }
}
