//! ---
//! reop_section: "03-assistant"
//! reop_subsection: "module"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Rule-based assistant replies and conversation transcript."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
use rand::prelude::*;

use reop_telemetry::model::EnergySnapshot;

/// Opening message seeded into every fresh transcript.
pub const GREETING: &str = "Hello! I'm your energy assistant. I can help you with \
real-time energy data, optimization recommendations, and answer questions about \
the REOP system. What would you like to know?";

/// One routing rule: a set of trigger substrings and the template they select.
struct Topic {
    /// Stable label surfaced in logs and metrics.
    name: &'static str,
    /// Case-insensitive substrings that route a query here.
    keywords: &'static [&'static str],
    respond: fn(&EnergySnapshot) -> String,
}

/// Ordered dispatch table. The first topic whose keyword matches wins, so a
/// query like "battery usage" is answered by the consumption template.
const TOPICS: &[Topic] = &[
    Topic {
        name: "generation",
        keywords: &["energy", "generation"],
        respond: generation_reply,
    },
    Topic {
        name: "consumption",
        keywords: &["consumption", "usage"],
        respond: consumption_reply,
    },
    Topic {
        name: "storage",
        keywords: &["battery", "storage"],
        respond: storage_reply,
    },
    Topic {
        name: "carbon",
        keywords: &["carbon", "savings", "co2"],
        respond: carbon_reply,
    },
    Topic {
        name: "efficiency",
        keywords: &["efficiency", "performance"],
        respond: efficiency_reply,
    },
    Topic {
        name: "alerts",
        keywords: &["alert", "problem", "issue"],
        respond: alerts_reply,
    },
    Topic {
        name: "optimization",
        keywords: &["optimize", "recommendation"],
        respond: optimization_reply,
    },
    Topic {
        name: "help",
        keywords: &["help", "what can you do"],
        respond: help_reply,
    },
];

/// Reply assembled for one operator question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    /// Which topic template answered, `"general"` for the fallback.
    pub topic: &'static str,
    pub text: String,
}

/// Keyword router producing assistant replies from the latest snapshot.
///
/// Every reply is a pure function of the query and the snapshot except the
/// fallback, which draws one of three canned responses from the internal RNG.
/// Seeding the responder therefore makes whole conversations reproducible.
#[derive(Debug)]
pub struct Responder {
    rng: StdRng,
}

impl Responder {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Route `query` to the first matching topic and render its template.
    pub fn reply(&mut self, query: &str, snapshot: &EnergySnapshot) -> AssistantReply {
        let normalized = query.to_lowercase();
        for topic in TOPICS {
            if topic.keywords.iter().any(|kw| normalized.contains(kw)) {
                return AssistantReply {
                    topic: topic.name,
                    text: (topic.respond)(snapshot),
                };
            }
        }
        AssistantReply {
            topic: "general",
            text: self.fallback_reply(query, snapshot),
        }
    }

    /// Catch-all for queries no topic claims. Echoes the original question
    /// verbatim, so the raw (not lowercased) query is interpolated.
    fn fallback_reply(&mut self, query: &str, snapshot: &EnergySnapshot) -> String {
        match self.rng.gen_range(0..3) {
            0 => format!(
                "I understand you're asking about \"{query}\". Let me check the current \
                 system data... Based on our latest readings, everything is operating \
                 within normal parameters. Could you be more specific about what \
                 information you need?"
            ),
            1 => format!(
                "That's an interesting question about \"{query}\". Currently, our \
                 renewable energy system is generating {:.1} kW and consuming {:.1} kW. \
                 Is there a particular aspect you'd like me to focus on?",
                snapshot.total_generation_kw(),
                snapshot.consumption.current,
            ),
            _ => format!(
                "Regarding \"{query}\", I'd be happy to help! Our system is currently \
                 operating at high efficiency with good renewable energy utilization. \
                 What specific data or recommendations would be most helpful for you?"
            ),
        }
    }
}

fn generation_reply(snapshot: &EnergySnapshot) -> String {
    format!(
        "Current energy generation is {:.1} kW. Solar is producing {:.1} kW ({}% \
         efficiency) and wind is producing {:.1} kW ({}% efficiency). Would you like \
         more details about any specific source?",
        snapshot.total_generation_kw(),
        snapshot.solar.current,
        snapshot.solar.efficiency,
        snapshot.wind.current,
        snapshot.wind.efficiency,
    )
}

fn consumption_reply(snapshot: &EnergySnapshot) -> String {
    let by_category = &snapshot.consumption.by_category;
    format!(
        "Current energy consumption is {:.1} kW. The breakdown is: HVAC {:.1} kW, \
         Lighting {:.1} kW, Equipment {:.1} kW, and Other {:.1} kW. Peak consumption \
         today is expected around 16:00.",
        snapshot.consumption.current,
        by_category.hvac,
        by_category.lighting,
        by_category.equipment,
        by_category.other,
    )
}

fn storage_reply(snapshot: &EnergySnapshot) -> String {
    let storage = &snapshot.storage;
    let direction = if storage.is_charging() {
        "charging"
    } else {
        "discharging"
    };
    format!(
        "Battery storage is currently at {:.1}% capacity ({:.1} kWh of {} kWh). The \
         system is currently {} with a net rate of {:+.1} kW.",
        storage.percent_full(),
        storage.current,
        storage.capacity,
        direction,
        storage.net_rate_kw(),
    )
}

fn carbon_reply(snapshot: &EnergySnapshot) -> String {
    let carbon = &snapshot.carbon_savings;
    format!(
        "Today's carbon savings are {:.1} kg CO₂. This month we've saved {:.1} kg CO₂, \
         and our total carbon offset is {:.1} kg CO₂. This is equivalent to planting \
         approximately {} trees!",
        carbon.today,
        carbon.monthly,
        carbon.total_offset,
        (carbon.total_offset / 22.0).floor() as i64,
    )
}

fn efficiency_reply(snapshot: &EnergySnapshot) -> String {
    format!(
        "System efficiency is excellent! We're currently achieving {:.1}% grid \
         independence. Solar panels are operating at {}% efficiency and wind turbines \
         at {}% efficiency. Overall system performance is 91.2% which is above our \
         target of 85%.",
        snapshot.grid_independence_pct(),
        snapshot.solar.efficiency,
        snapshot.wind.efficiency,
    )
}

fn alerts_reply(snapshot: &EnergySnapshot) -> String {
    let active: Vec<&str> = snapshot
        .alerts
        .iter()
        .filter(|alert| !alert.acknowledged)
        .map(|alert| alert.message.as_str())
        .collect();
    if active.is_empty() {
        return "Great news! There are currently no active alerts. All systems are \
                operating normally. The last system check was completed successfully \
                and all equipment is performing within optimal parameters."
            .to_owned();
    }
    format!(
        "There are {} active alert(s): {}. Would you like me to help you troubleshoot \
         any of these issues?",
        active.len(),
        active.join(", "),
    )
}

fn optimization_reply(_snapshot: &EnergySnapshot) -> String {
    "Based on current data, I recommend: 1) Shifting 15% of equipment load to \
     10:00-14:00 when solar generation peaks, 2) Reducing HVAC load by 8% during \
     16:00-19:00 peak hours, 3) Scheduling energy-intensive workshops during \
     11:00-15:00. These optimizations could save approximately 12 kWh/day and reduce \
     grid dependence by 5%."
        .to_owned()
}

fn help_reply(_snapshot: &EnergySnapshot) -> String {
    "I can help you with:\n\
     • Real-time energy data and insights\n\
     • Carbon savings information\n\
     • System performance metrics\n\
     • Energy optimization recommendations\n\
     • Troubleshooting and alerts\n\
     • Battery storage status\n\
     • Generation forecasts\n\
     • Consumption analysis\n\n\
     Just ask me anything about the energy system!"
        .to_owned()
}
