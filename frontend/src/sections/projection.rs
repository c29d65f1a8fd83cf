use log::{error, info};
use serde::Deserialize;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::browser::{storage_get, storage_set};
use crate::config::{REVENUE_STORAGE_KEY, TIER_STORAGE_KEY};
use crate::utils::{format_brl, format_currency_brl, parse_currency_input};

pub const AUTO_TIER: &str = "__auto__";

/// Ladder shown in the "Escada de Parceria" section.
pub const TIER_CONFIG: &str = r#"{
  "texto": {
    "titulo": "Escada de Parceria",
    "subtitulo": "Quanto mais o seu polo fatura, maior a sua comissão."
  },
  "tiers": [
    { "id": "ouro", "nome": "Ouro", "descricao": "Polos consolidados com equipe comercial dedicada.", "minRevenue": 50000, "maxRevenue": 99999.99, "comissao": 0.35 },
    { "id": "inicial", "nome": "Inicial", "descricao": "Primeiros meses de operação do polo.", "minRevenue": 0, "maxRevenue": 9999.99, "comissao": 0.25 },
    { "id": "prata", "nome": "Prata", "descricao": "Polo com carteira de alunos recorrente.", "minRevenue": 10000, "maxRevenue": 49999.99, "comissao": 0.30 },
    { "id": "diamante", "nome": "Diamante", "descricao": "Os maiores parceiros da rede Educa+.", "minRevenue": 100000, "maxRevenue": null, "comissao": 0.40, "destaque": true }
  ]
}"#;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tier {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "nome")]
    pub name: String,
    #[serde(default, rename = "descricao")]
    pub description: String,
    #[serde(default, rename = "minRevenue")]
    pub min_revenue: f64,
    #[serde(default, rename = "maxRevenue")]
    pub max_revenue: Option<f64>,
    #[serde(default, rename = "comissao")]
    pub commission: Option<f64>,
    #[serde(default, rename = "destaque")]
    pub highlight: bool,
}

impl Tier {
    pub fn contains(&self, revenue: f64) -> bool {
        revenue >= self.min_revenue && self.max_revenue.map_or(true, |max| revenue <= max)
    }

    pub fn range_label(&self) -> String {
        match self.max_revenue {
            Some(max) => format!("{} – {}", format_brl(self.min_revenue), format_brl(max)),
            None => format!("A partir de {}", format_brl(self.min_revenue)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
struct TierTexts {
    #[serde(default, rename = "titulo")]
    title: Option<String>,
    #[serde(default, rename = "subtitulo")]
    subtitle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct RawTierConfig {
    #[serde(default)]
    tiers: Vec<Tier>,
    #[serde(default, rename = "texto")]
    texts: TierTexts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierConfig {
    /// Ascending by `min_revenue`.
    pub tiers: Vec<Tier>,
    pub title: String,
    pub subtitle: String,
}

impl TierConfig {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        let raw: RawTierConfig = serde_json::from_str(json)?;
        let mut tiers = raw.tiers;
        for tier in &mut tiers {
            tier.id = tier.id.trim().to_string();
            tier.name = tier.name.trim().to_string();
            tier.description = tier.description.trim().to_string();
        }
        tiers.sort_by(|a, b| a.min_revenue.total_cmp(&b.min_revenue));
        Ok(Self {
            tiers,
            title: raw.texts.title.unwrap_or_else(|| "Escada de Parceria".to_string()),
            subtitle: raw
                .texts
                .subtitle
                .unwrap_or_else(|| "Descubra seu potencial de ganhos.".to_string()),
        })
    }

    pub fn find_tier_by_revenue(&self, revenue: f64) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.contains(revenue))
    }

    pub fn tier(&self, id: &str) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.id == id)
    }

    /// Lowest tier starting above `revenue`, with the amount still missing.
    pub fn next_tier(&self, revenue: f64) -> Option<(&Tier, f64)> {
        self.tiers
            .iter()
            .find(|t| t.min_revenue > revenue)
            .map(|t| (t, (t.min_revenue - revenue).max(0.0)))
    }

    pub fn project(&self, revenue: f64, choice: &TierChoice) -> Projection<'_> {
        let tier = match choice {
            TierChoice::Auto => self.find_tier_by_revenue(revenue),
            TierChoice::Manual(id) => self.tier(id),
        };
        let monthly = tier.and_then(|t| t.commission).map(|c| revenue * c);
        Projection {
            tier,
            monthly,
            annual: monthly.map(|m| m * 12.0),
            next: self.next_tier(revenue),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierChoice {
    Auto,
    Manual(String),
}

impl TierChoice {
    pub fn from_value(value: &str) -> Self {
        if value.is_empty() || value == AUTO_TIER {
            TierChoice::Auto
        } else {
            TierChoice::Manual(value.to_string())
        }
    }

    pub fn value(&self) -> &str {
        match self {
            TierChoice::Auto => AUTO_TIER,
            TierChoice::Manual(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection<'a> {
    pub tier: Option<&'a Tier>,
    pub monthly: Option<f64>,
    pub annual: Option<f64>,
    pub next: Option<(&'a Tier, f64)>,
}

fn percent(commission: Option<f64>) -> String {
    commission.map_or_else(|| "—".to_string(), |c| format!("{:.0}%", c * 100.0))
}

fn saved_choice(config: &TierConfig) -> TierChoice {
    match storage_get(TIER_STORAGE_KEY).map(|v| TierChoice::from_value(&v)) {
        Some(TierChoice::Manual(id)) if config.tier(&id).is_some() => TierChoice::Manual(id),
        _ => TierChoice::Auto,
    }
}

fn saved_revenue() -> f64 {
    storage_get(REVENUE_STORAGE_KEY)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

#[derive(Properties, PartialEq)]
struct LadderProps {
    config: TierConfig,
    revenue: f64,
    choice: TierChoice,
}

#[function_component(TierLadder)]
fn tier_ladder(props: &LadderProps) -> Html {
    let projection = props.config.project(props.revenue, &props.choice);
    let current = projection.tier.map(|t| t.id.clone());
    let next = projection
        .next
        .map(|(t, _)| t.id.clone())
        .filter(|id| Some(id) != current.as_ref());

    html! {
        <div id="tier-ladder" class="space-y-4">
            { for props.config.tiers.iter().enumerate().map(|(index, tier)| {
                let is_current = current.as_deref() == Some(tier.id.as_str());
                let is_next = next.as_deref() == Some(tier.id.as_str());
                html! {
                    <div class={classes!("tier-step", is_current.then_some("active-tier"), is_next.then_some("next-tier"), tier.highlight.then_some("tier-highlight"))}
                        data-tier-id={tier.id.clone()}>
                        <div class="tier-step-number">{index + 1}</div>
                        <div class="tier-percentage">{percent(tier.commission)}</div>
                        <div class="tier-content">
                            <h4 class="tier-title">{&tier.name}</h4>
                            <p class="tier-description">{&tier.description}</p>
                            <span class="tier-range">{tier.range_label()}</span>
                        </div>
                        if is_current { <span class="tier-label">{"🎯 Tier Atual"}</span> }
                        if is_next { <span class="tier-label">{"🚀 Próximo"}</span> }
                    </div>
                }
            }) }
        </div>
    }
}

#[function_component(PartnershipLadder)]
pub fn partnership_ladder() -> Html {
    let parsed = use_memo(|_| TierConfig::parse(TIER_CONFIG), ());
    let revenue = use_state(saved_revenue);
    let choice = {
        let parsed = parsed.clone();
        use_state(move || match parsed.as_ref() {
            Ok(config) => saved_choice(config),
            Err(_) => TierChoice::Auto,
        })
    };

    {
        let parsed = parsed.clone();
        use_effect_with_deps(
            move |_| {
                match parsed.as_ref() {
                    Ok(config) => info!("Partnership ladder ready with {} tiers", config.tiers.len()),
                    Err(e) => error!("Could not read partnership ladder configuration: {}", e),
                }
                || ()
            },
            (),
        );
    }

    let config = match parsed.as_ref() {
        Ok(config) => config.clone(),
        Err(_) => {
            return html! {
                <section id="escada-parceria" class="mx-auto max-w-xl text-center py-20">
                    <h2 class="text-3xl font-extrabold text-red-600">{"⚠️ Erro ao carregar configuração"}</h2>
                    <p class="mt-4 text-lg text-gray-700">{"Verifique a configuração JSON."}</p>
                </section>
            };
        }
    };

    let on_revenue = {
        let revenue = revenue.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let raw = input.value();
            let parsed = parse_currency_input(&raw);
            // Re-mask in place so the caret stays at the end.
            input.set_value(&format_currency_brl(&raw));
            storage_set(REVENUE_STORAGE_KEY, &parsed.to_string());
            revenue.set(parsed);
        })
    };
    let on_choice = {
        let choice = choice.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let value = select.value();
            storage_set(TIER_STORAGE_KEY, &value);
            choice.set(TierChoice::from_value(&value));
        })
    };

    let projection = config.project(*revenue, &choice);
    let missing_commission = projection.tier.and_then(|t| t.commission).is_none();
    let next_step = match projection.next {
        None => html! { {"🏆 Você está no topo da escada de parceria!"} },
        Some((tier, missing)) => html! {
            <>{format!("🎯 Faltam {} para atingir \"", format_brl(missing))}<strong>{&tier.name}</strong>{"\""}</>
        },
    };

    html! {
        <section id="escada-parceria" class="py-20 bg-white">
            <div class="container mx-auto px-4">
                <h2 id="section-title" class="text-4xl font-bold text-center text-educa-blue">{&config.title}</h2>
                <p id="section-subtitle" class="text-center text-gray-600 mt-4 mb-12">{&config.subtitle}</p>
                <div class="grid md:grid-cols-2 gap-12">
                    <TierLadder config={config.clone()} revenue={*revenue} choice={(*choice).clone()} />
                    <div class="bg-gray-50 rounded-2xl p-8 space-y-4">
                        <label class="block font-semibold" for="faturamento-input">{"Meta de faturamento mensal"}</label>
                        <input id="faturamento-input" type="text" inputmode="numeric" class="w-full border rounded-lg px-4 py-3"
                            value={format_brl(*revenue)} oninput={on_revenue} />
                        <label class="block font-semibold" for="tier-select">{"Tier"}</label>
                        <select id="tier-select" class="w-full border rounded-lg px-4 py-3" onchange={on_choice}>
                            <option value={AUTO_TIER} selected={*choice == TierChoice::Auto}>
                                {"Selecionar automaticamente pela meta de investimento"}
                            </option>
                            { for config.tiers.iter().map(|tier| {
                                let range = match tier.max_revenue {
                                    Some(max) => format!("{} – {}", format_brl(tier.min_revenue), format_brl(max)),
                                    None => format!("≥ {}", format_brl(tier.min_revenue)),
                                };
                                html! {
                                    <option value={tier.id.clone()} selected={choice.value() == tier.id}>
                                        {format!("{} • {} • comissão: {}", tier.name, range, percent(tier.commission))}
                                    </option>
                                }
                            }) }
                        </select>
                        <div class="flex justify-between"><span>{"Comissão"}</span><span id="comissao-percent">{percent(projection.tier.and_then(|t| t.commission))}</span></div>
                        <p id="comissao-alert" class={classes!("text-sm", "text-red-500", (!missing_commission).then_some("hidden"))}>
                            {"Nenhum tier corresponde a esse faturamento."}
                        </p>
                        <div class="flex justify-between"><span>{"Ganhos mensais"}</span><span id="ganhos-mensais">{projection.monthly.map_or_else(|| "—".to_string(), format_brl)}</span></div>
                        <div class="flex justify-between"><span>{"Ganhos anuais"}</span><span id="ganhos-anuais">{projection.annual.map_or_else(|| "—".to_string(), format_brl)}</span></div>
                        <p id="proximo-passo" class="font-semibold text-educa-blue">{ next_step }</p>
                    </div>
                </div>
            </div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TierConfig {
        TierConfig::parse(TIER_CONFIG).unwrap()
    }

    #[test]
    fn tiers_are_sorted_by_minimum_revenue() {
        let ids: Vec<_> = config().tiers.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, ["inicial", "prata", "ouro", "diamante"]);
    }

    #[test]
    fn finds_tier_including_boundaries() {
        let config = config();
        assert_eq!(config.find_tier_by_revenue(0.0).unwrap().id, "inicial");
        assert_eq!(config.find_tier_by_revenue(10_000.0).unwrap().id, "prata");
        assert_eq!(config.find_tier_by_revenue(49_999.99).unwrap().id, "prata");
        assert_eq!(config.find_tier_by_revenue(5_000_000.0).unwrap().id, "diamante");
        // Falls in the gap between two tiers.
        assert!(config.find_tier_by_revenue(9_999.995).is_none());
    }

    #[test]
    fn next_tier_reports_missing_amount() {
        let config = config();
        let (tier, missing) = config.next_tier(8_000.0).unwrap();
        assert_eq!(tier.id, "prata");
        assert_eq!(missing, 2_000.0);
        assert!(config.next_tier(150_000.0).is_none());
    }

    #[test]
    fn manual_choice_overrides_revenue() {
        let config = config();
        let projection = config.project(20_000.0, &TierChoice::Manual("ouro".into()));
        assert_eq!(projection.tier.unwrap().id, "ouro");
        assert_eq!(projection.monthly, Some(7_000.0));
        assert_eq!(projection.annual, Some(84_000.0));

        let auto = config.project(20_000.0, &TierChoice::Auto);
        assert_eq!(auto.monthly, Some(6_000.0));
    }

    #[test]
    fn unknown_or_commissionless_tier_has_no_earnings() {
        let config = TierConfig::parse(r#"{"tiers":[{"id":" base ","nome":"Base","minRevenue":0}]}"#).unwrap();
        assert_eq!(config.tiers[0].id, "base");
        assert_eq!(config.title, "Escada de Parceria");
        let projection = config.project(1_000.0, &TierChoice::Auto);
        assert_eq!(projection.tier.unwrap().id, "base");
        assert_eq!(projection.monthly, None);
        assert_eq!(projection.annual, None);

        let missing = config.project(1_000.0, &TierChoice::Manual("gone".into()));
        assert!(missing.tier.is_none());
    }

    #[test]
    fn choice_round_trips_through_storage_value() {
        assert_eq!(TierChoice::from_value(AUTO_TIER), TierChoice::Auto);
        assert_eq!(TierChoice::from_value("ouro").value(), "ouro");
        assert!(TierConfig::parse("not json").is_err());
    }
}
