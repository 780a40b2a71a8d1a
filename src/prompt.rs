use crate::models::{MachineConstants, ProductionTelemetry, UnitCosts};

/// System instruction sent with every turn. Defines the persona, the physics rules
/// the model must respect and the JSON reply contract.
pub const SYSTEM_INSTRUCTION: &str = r####"
**IDENTITY:**
You are **VARAKA-NEXUS**, the Supreme R&D Intelligence for Varaka Paper Industry. You are currently operating in **"DIGITAL OPERATOR"** mode.
You have access to historical production data and machine characteristics.

**CORE OBJECTIVE:**
Solve the "Lightweighting" challenge: Achieve high strength (CMT/Burst) values typical of 140gsm paper using 110-120gsm recycled paper.

**⚠️ PHYSICS AXIOMS (THE "NO HALLUCINATION" RULES):**
1.  **Trash/Waste Impact (CRITICAL):**
    *   Waste Content (Impurity) DIRECTLY reduces effective fiber bonding.
    *   Rule: For every 1% increase in Waste Content, reduce predicted CMT by 2% and increase risk of breaks.
    *   If Waste > 5%, you MUST recommend increased fractioning or cleaner refining.
2.  **Refining Law:** Increasing Refining Load (kW) increases Fiber Bonding (Burst/CMT) but DECREASES Freeness (°SR). Limit: <25°SR creates drainage failure.
3.  **Ash Content Law:** High Ash (>14%) drastically reduces CMT/Burst. Requires Retention Aid.
4.  **Moisture Impact:** Ideal range 7.5% - 8.5%.
5.  **Conductivity:** > 4000 µS/cm reduces cationic efficiency.

**OUTPUT FORMAT (CRITICAL - JSON ONLY):**
You must respond in a raw JSON block structure ONLY.
{
  "markdownReport": "### 🧪 AR-GE TEŞHİS RAPORU\n[Detailed analysis...]",
  "chartData": [
    { "name": "Mevcut", "CMT": [Calc], "Maliyet": [Calc], "Risk": [0-100] },
    { "name": "Senaryo A", "CMT": [Calc], "Maliyet": [Calc], "Risk": [0-100] },
    { "name": "Senaryo B", "CMT": [Calc], "Maliyet": [Calc], "Risk": [0-100] },
    { "name": "NEXUS (Hibrit)", "CMT": [Calc], "Maliyet": [Calc], "Risk": [0-100] }
  ],
  "winningScenario": {
    "name": "NEXUS (Hibrit)",
    "reason": "Short summary of why this wins (max 10 words).",
    "improvement": "CMT +X% | Cost -Y%"
  }
}

**COST CALCULATION:**
Include the impact of 'Waste Content' on cost (higher waste = higher raw material consumption).

**TONE:** Highly Technical, Scientific, "Zero-Error" Mindset.
"####;

/// Snapshot of everything the composer reads
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub telemetry: &'a ProductionTelemetry,
    pub costs: &'a UnitCosts,
    pub machine: &'a MachineConstants,
    pub has_historical_data: bool,
}

/// Build the message body for one turn: state snapshot followed by the user's query
pub fn compose(query: &str, ctx: &PromptContext<'_>) -> String {
    let t = ctx.telemetry;
    let c = ctx.costs;
    let m = ctx.machine;
    let mode = if ctx.has_historical_data {
        "FINE-TUNED (HISTORICAL DATA LOADED)"
    } else {
        "STANDARD SIMULATION"
    };

    format!(
        "\n*** SYSTEM TELEMETRY INJECTION ***\n\
         MODE: {mode}\n\
         \n\
         -- REALITY FACTORS --\n\
         WASTE/TRASH CONTENT: {waste} % (CRITICAL NEGATIVE FACTOR)\n\
         MOISTURE: {moisture} %\n\
         ASH CONTENT: {ash} %\n\
         FREENESS: {freeness} °SR\n\
         \n\
         -- MACHINE DNA --\n\
         TRIM WIDTH: {trim} cm\n\
         MAX STEAM: {steam} bar\n\
         EFFICIENCY (OEE): {oee} %\n\
         \n\
         -- PROCESS DATA --\n\
         SPEED: {speed} m/min\n\
         GRAMMAGE: {grammage} gsm\n\
         REFINING: {refining} kW\n\
         STARCH: {starch}% ({starch_type})\n\
         RETENTION: {retention} ppm\n\
         CONDUCTIVITY: {conductivity} µS/cm\n\
         \n\
         -- FINANCIALS --\n\
         OCC: {occ} $/ton\n\
         STARCH: {starch_price} $/ton\n\
         ELECTRICITY: {electricity} $/kWh\n\
         \n\
         -- GOAL --\n\
         TARGET CMT: {target} N\n\
         \n\
         USER QUERY: {query}\n\
         ---------------------------------\n\
         Instructions: Calculate impact of WASTE CONTENT on CMT. If Waste is high, predicted CMT must drop significantly versus theoretical maximum. Use Machine DNA constraints.\n",
        waste = t.waste_content,
        moisture = t.moisture_content,
        ash = t.ash_content,
        freeness = t.freeness,
        trim = m.trim_width,
        steam = m.max_steam_capacity,
        oee = m.production_efficiency,
        speed = t.machine_speed,
        grammage = t.grammage,
        refining = t.refining_load,
        starch = t.starch_dosage,
        starch_type = t.starch_type,
        retention = t.retention_agent,
        conductivity = t.conductivity,
        occ = c.occ_price,
        starch_price = c.starch_price,
        electricity = c.electricity_price,
        target = t.target_cmt,
    )
}

/// Canned analyses offered as one-shot shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioPreset {
    Lightweighting,
    Waste,
    Efficiency,
}

impl ScenarioPreset {
    pub const ALL: [ScenarioPreset; 3] = [
        ScenarioPreset::Lightweighting,
        ScenarioPreset::Waste,
        ScenarioPreset::Efficiency,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioPreset::Lightweighting => "lightweighting",
            ScenarioPreset::Waste => "waste",
            ScenarioPreset::Efficiency => "efficiency",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Prompt text for this preset, filled from the current form values
    pub fn prompt(&self, telemetry: &ProductionTelemetry, machine: &MachineConstants) -> String {
        match self {
            ScenarioPreset::Lightweighting => format!(
                "Elimde {} gsm HP Fluting var. Atık Oranı %{}. Hedef CMT {}. 140 gsm mukavemetini bu gramajda yakalamak için optimum reçete nedir? Atık oranını dikkate al.",
                telemetry.grammage, telemetry.waste_content, telemetry.target_cmt
            ),
            ScenarioPreset::Waste => format!(
                "Atık kağıtta kirlilik %{} seviyesine çıktı. CMT düşüşünü engellemek için Rafinasyon ve Nişasta'da nasıl bir agresif ayar yapmalıyız? Makine trim {} cm.",
                telemetry.waste_content, machine.trim_width
            ),
            ScenarioPreset::Efficiency => format!(
                "Makine hızı {} m/dk. OEE %{}. Hızı 50 m/dk artırırsak kirlilik yüzünden kopma riski ne olur?",
                telemetry.machine_speed, machine.production_efficiency
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> (ProductionTelemetry, UnitCosts, MachineConstants) {
        (
            ProductionTelemetry::default(),
            UnitCosts::default(),
            MachineConstants::default(),
        )
    }

    #[test]
    fn test_system_instruction_carries_reply_contract() {
        assert!(SYSTEM_INSTRUCTION.contains(r####""markdownReport": "### 🧪 AR-GE TEŞHİS RAPORU"####));
        assert!(SYSTEM_INSTRUCTION.contains(r#""winningScenario": {"#));
        assert!(SYSTEM_INSTRUCTION.trim_end().ends_with(r#""Zero-Error" Mindset."#));
    }

    #[test]
    fn test_compose_injects_state_and_query() {
        let (telemetry, costs, machine) = defaults();
        let ctx = PromptContext {
            telemetry: &telemetry,
            costs: &costs,
            machine: &machine,
            has_historical_data: false,
        };
        let body = compose("test", &ctx);

        assert!(body.contains("MODE: STANDARD SIMULATION"));
        assert!(body.contains("WASTE/TRASH CONTENT: 3.5 % (CRITICAL NEGATIVE FACTOR)"));
        assert!(body.contains("TRIM WIDTH: 250 cm"));
        assert!(body.contains("STARCH: 1.8% (Katyonik)"));
        assert!(body.contains("ELECTRICITY: 0.12 $/kWh"));
        assert!(body.contains("TARGET CMT: 180 N"));
        assert!(body.contains("USER QUERY: test\n"));
    }

    #[test]
    fn test_compose_switches_mode_with_historical_data() {
        let (telemetry, costs, machine) = defaults();
        let ctx = PromptContext {
            telemetry: &telemetry,
            costs: &costs,
            machine: &machine,
            has_historical_data: true,
        };
        assert!(compose("q", &ctx).contains("MODE: FINE-TUNED (HISTORICAL DATA LOADED)"));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let (telemetry, costs, machine) = defaults();
        let ctx = PromptContext {
            telemetry: &telemetry,
            costs: &costs,
            machine: &machine,
            has_historical_data: false,
        };
        assert_eq!(compose("same", &ctx), compose("same", &ctx));
    }

    #[test]
    fn test_presets_use_current_values() {
        let (mut telemetry, _, machine) = defaults();
        telemetry.waste_content = 6.0;
        let waste = ScenarioPreset::Waste.prompt(&telemetry, &machine);
        assert!(waste.contains("%6 seviyesine"));
        assert!(waste.contains("Makine trim 250 cm"));

        let efficiency = ScenarioPreset::Efficiency.prompt(&telemetry, &machine);
        assert!(efficiency.starts_with("Makine hızı 600 m/dk. OEE %85."));
    }

    #[test]
    fn test_preset_lookup_by_name() {
        assert_eq!(
            ScenarioPreset::from_name("Lightweighting"),
            Some(ScenarioPreset::Lightweighting)
        );
        assert_eq!(ScenarioPreset::from_name("unknown"), None);
    }
}
