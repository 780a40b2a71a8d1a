use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Lenient number deserializer: models sometimes quote numeric chart values or
/// put words where numbers belong. Anything that is not a finite number reads as absent.
fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite()))
}

/// Strings from the model: numbers are rendered as text, anything else reads as empty
fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Keeps the chart entries that are objects; a non-array chart reads as empty
fn deserialize_lenient_chart<'de, D>(deserializer: D) -> Result<Vec<ScenarioPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter(serde_json::Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn deserialize_lenient_winner<'de, D>(deserializer: D) -> Result<Option<WinningScenario>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(item @ serde_json::Value::Object(_)) => serde_json::from_value(item).ok(),
        _ => None,
    })
}

/// Implements `Display` using the same label the enum serializes to.
macro_rules! display_as_label {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperGrade {
    #[serde(rename = "Fluting")]
    Fluting,
    #[serde(rename = "Testliner")]
    Testliner,
    #[serde(rename = "HP Fluting")]
    HpFluting,
    #[serde(rename = "Imitation Kraft")]
    ImitationKraft,
}

impl PaperGrade {
    pub fn label(&self) -> &'static str {
        match self {
            PaperGrade::Fluting => "Fluting",
            PaperGrade::Testliner => "Testliner",
            PaperGrade::HpFluting => "HP Fluting",
            PaperGrade::ImitationKraft => "Imitation Kraft",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawMaterialQuality {
    #[serde(rename = "High (A1)")]
    High,
    #[serde(rename = "Medium (Mixed)")]
    Medium,
    #[serde(rename = "Low (A3/Local)")]
    Low,
}

impl RawMaterialQuality {
    pub fn label(&self) -> &'static str {
        match self {
            RawMaterialQuality::High => "High (A1)",
            RawMaterialQuality::Medium => "Medium (Mixed)",
            RawMaterialQuality::Low => "Low (A3/Local)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiberType {
    #[serde(rename = "100% OCC")]
    Occ100,
    #[serde(rename = "80% OCC - 20% Mix")]
    Occ80Mix20,
    #[serde(rename = "Karışık (A3)")]
    MixedA3,
    #[serde(rename = "Kraft/NSSC")]
    KraftNssc,
}

impl FiberType {
    pub fn label(&self) -> &'static str {
        match self {
            FiberType::Occ100 => "100% OCC",
            FiberType::Occ80Mix20 => "80% OCC - 20% Mix",
            FiberType::MixedA3 => "Karışık (A3)",
            FiberType::KraftNssc => "Kraft/NSSC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StarchType {
    Katyonik,
    Amfoterik,
    Nativ,
    Okside,
}

impl StarchType {
    pub fn label(&self) -> &'static str {
        match self {
            StarchType::Katyonik => "Katyonik",
            StarchType::Amfoterik => "Amfoterik",
            StarchType::Nativ => "Nativ",
            StarchType::Okside => "Okside",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlueType {
    #[serde(rename = "ASA")]
    Asa,
    #[serde(rename = "AKD")]
    Akd,
    Rosin,
    Yok,
}

impl GlueType {
    pub fn label(&self) -> &'static str {
        match self {
            GlueType::Asa => "ASA",
            GlueType::Akd => "AKD",
            GlueType::Rosin => "Rosin",
            GlueType::Yok => "Yok",
        }
    }
}

display_as_label!(PaperGrade);
display_as_label!(RawMaterialQuality);
display_as_label!(FiberType);
display_as_label!(StarchType);
display_as_label!(GlueType);

/// Live process parameters edited by the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductionTelemetry {
    pub grade: PaperGrade,
    /// g/m2
    pub grammage: f64,
    /// m/min
    pub machine_speed: f64,
    /// bar
    pub steam_pressure: f64,
    /// kW
    pub refining_load: f64,
    /// %
    pub starch_dosage: f64,
    /// ppm
    pub retention_agent: f64,
    /// N
    #[serde(rename = "targetCMT")]
    pub target_cmt: f64,
    pub raw_material_quality: RawMaterialQuality,

    pub fiber_type: FiberType,
    pub starch_type: StarchType,
    pub glue_type: GlueType,
    pub ph_level: f64,
    /// µS/cm
    pub conductivity: f64,

    /// °SR
    pub freeness: f64,
    /// %
    pub ash_content: f64,
    /// %
    pub moisture_content: f64,
    /// Contamination share of the recycled fiber input, %
    pub waste_content: f64,
}

impl Default for ProductionTelemetry {
    fn default() -> Self {
        Self {
            grade: PaperGrade::HpFluting,
            grammage: 120.0,
            machine_speed: 600.0,
            steam_pressure: 3.2,
            refining_load: 350.0,
            starch_dosage: 1.8,
            retention_agent: 200.0,
            target_cmt: 180.0,
            raw_material_quality: RawMaterialQuality::Low,
            fiber_type: FiberType::Occ100,
            starch_type: StarchType::Katyonik,
            glue_type: GlueType::Asa,
            ph_level: 7.2,
            conductivity: 3500.0,
            freeness: 35.0,
            ash_content: 12.0,
            moisture_content: 7.5,
            waste_content: 3.5,
        }
    }
}

/// Fixed machine characteristics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MachineConstants {
    /// cm
    pub trim_width: f64,
    /// bar
    pub max_steam_capacity: f64,
    /// OEE, %
    pub production_efficiency: f64,
    pub dryer_count: f64,
}

impl Default for MachineConstants {
    fn default() -> Self {
        Self {
            trim_width: 250.0,
            max_steam_capacity: 5.0,
            production_efficiency: 85.0,
            dryer_count: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitCosts {
    /// $/kWh
    pub electricity_price: f64,
    /// $/ton
    pub steam_price: f64,
    /// $/ton
    pub starch_price: f64,
    /// $/ton
    pub occ_price: f64,
    /// $/m3
    pub fresh_water_price: f64,
}

impl Default for UnitCosts {
    fn default() -> Self {
        Self {
            electricity_price: 0.12,
            steam_price: 25.0,
            starch_price: 600.0,
            occ_price: 150.0,
            fresh_water_price: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One entry of the chat transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message with a generated ID and the current timestamp
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self::new(Role::Model, content)
    }
}

/// One bar group of the scenario comparison chart. Values the model left out
/// or could not express as numbers are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPoint {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub name: String,
    #[serde(rename = "CMT", default, deserialize_with = "deserialize_lenient_f64")]
    pub cmt: Option<f64>,
    #[serde(rename = "Maliyet", default, deserialize_with = "deserialize_lenient_f64")]
    pub cost: Option<f64>,
    #[serde(rename = "Risk", default, deserialize_with = "deserialize_lenient_f64")]
    pub risk: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinningScenario {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub reason: String,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub improvement: String,
}

/// Structured reply the model is instructed to produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSimulationResponse {
    pub markdown_report: String,
    #[serde(default, deserialize_with = "deserialize_lenient_chart")]
    pub chart_data: Vec<ScenarioPoint>,
    #[serde(default, deserialize_with = "deserialize_lenient_winner")]
    pub winning_scenario: Option<WinningScenario>,
}

/// A prior turn as handed to the model gateway
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryTurn {
    pub role: Role,
    pub text: String,
}

// Gemini generateContent request format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

// Gemini generateContent response format
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it carries any
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        if text.is_empty() { None } else { Some(text) }
    }
}
