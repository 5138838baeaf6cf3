// Browser binding: the page owns the WebSocket and animation frames and forwards them here.

use serde::Serialize;
use telemetry_core::dispatch::{Category, DispatchReport};
use telemetry_core::model::Snapshot;
use telemetry_core::render::{LinkStatus, RenderTargets};
use telemetry_core::session::SessionReadout;
use telemetry_core::{DashboardClient, DashboardSettings};
use wasm_bindgen::prelude::*;

#[derive(Debug, Serialize)]
pub struct FailedRender {
    pub category: Category,
    pub error: String,
}

/// What the page needs to repaint after one processed snapshot.
#[derive(Debug, Serialize)]
pub struct TickFrame<'a> {
    pub categories: Vec<Category>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedRender>,
    pub pose_fed: bool,
    pub snapshot: Option<&'a Snapshot>,
    pub readout: SessionReadout,
    pub link_status: LinkStatus,
}

pub fn tick_frame<'a>(client: &'a DashboardClient, report: DispatchReport) -> TickFrame<'a> {
    TickFrame {
        categories: report.rendered,
        failed: report
            .failed
            .into_iter()
            .map(|(category, err)| FailedRender {
                category,
                error: err.to_string(),
            })
            .collect(),
        pose_fed: report.pose_fed,
        snapshot: client.last_snapshot(),
        readout: client.readout(),
        link_status: client.link_status(),
    }
}

pub fn settings_from_json(config_json: Option<&str>) -> Result<DashboardSettings, serde_json::Error> {
    match config_json.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => serde_json::from_str(raw),
        None => Ok(DashboardSettings::default()),
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

#[wasm_bindgen]
pub struct WasmDashboard {
    client: DashboardClient,
}

#[wasm_bindgen]
impl WasmDashboard {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmDashboard, JsValue> {
        let settings = settings_from_json(config_json.as_deref())
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        Ok(Self {
            client: DashboardClient::new(settings, RenderTargets::headless()),
        })
    }

    /// Stream URL for the page origin, e.g. `location.origin`.
    pub fn endpoint(origin: &str) -> Result<String, JsValue> {
        DashboardClient::endpoint(origin)
            .map(|url| url.to_string())
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    pub fn connect(&mut self) {
        self.client.connect();
    }

    pub fn on_open(&mut self) {
        self.client.on_open();
    }

    pub fn on_error(&mut self, message: &str) {
        self.client.on_error(message);
    }

    /// Delay in ms for the page's reconnect timer, or `undefined` when one is already armed.
    pub fn on_close(&mut self) -> Option<u32> {
        self.client
            .on_close()
            .map(|delay_ms| u32::try_from(delay_ms).unwrap_or(u32::MAX))
    }

    pub fn reconnect_fired(&mut self) {
        self.client.reconnect_fired();
    }

    /// True when the page should request an animation frame.
    pub fn on_message(&mut self, raw: String) -> bool {
        self.client.on_message(raw)
    }

    pub fn tick(&mut self, now_ms: f64) -> Result<JsValue, JsValue> {
        match self.client.tick(now_ms) {
            Some(report) => to_js(&tick_frame(&self.client, report)),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    pub fn set_demo(&mut self, active: bool) {
        self.client.set_demo(active);
    }

    pub fn demo_step(&mut self, now_ms: f64) -> Result<JsValue, JsValue> {
        match self.client.demo_step(now_ms) {
            Some(report) => to_js(&tick_frame(&self.client, report)),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    pub fn readout(&self) -> Result<JsValue, JsValue> {
        to_js(&self.client.readout())
    }

    pub fn packet_count(&self) -> f64 {
        self.client.packet_count() as f64
    }

    pub fn link_status(&self) -> String {
        self.client.link_status().label().to_string()
    }

    pub fn connection_state(&self) -> String {
        self.client.connection_state().as_str().to_string()
    }
}
