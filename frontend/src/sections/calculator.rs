use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::analytics::{use_analytics, AnalyticsEvent, AnalyticsHandle};
use crate::utils::format_brl;

pub const COMMISSION_RATE: f64 = 0.4;
pub const TICKET_OPTIONS: &[u32] = &[150, 200, 250, 300];
const TOOL_NAME: &str = "profitability_calculator";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnershipSize {
    Small,
    Medium,
    Large,
    Custom,
}

impl PartnershipSize {
    pub fn parse(value: &str) -> Self {
        match value {
            "small" => PartnershipSize::Small,
            "medium" => PartnershipSize::Medium,
            "large" => PartnershipSize::Large,
            _ => PartnershipSize::Custom,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PartnershipSize::Small => "small",
            PartnershipSize::Medium => "medium",
            PartnershipSize::Large => "large",
            PartnershipSize::Custom => "custom",
        }
    }

    /// `(min, max, default)` student counts for the slider.
    pub fn student_range(&self) -> (u32, u32, u32) {
        match self {
            PartnershipSize::Small => (20, 50, 35),
            PartnershipSize::Medium => (50, 150, 100),
            PartnershipSize::Large => (150, 300, 200),
            PartnershipSize::Custom => (20, 300, 50),
        }
    }
}

/// Monthly figures for a partner with `students` paying `ticket` each.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profitability {
    pub gross_revenue: f64,
    pub commission: f64,
    pub operational_costs: f64,
    pub net_profit: f64,
    pub annual_profit: f64,
}

pub fn operational_costs(students: u32) -> f64 {
    let students = f64::from(students);
    if students <= 50.0 {
        (students * 15.0).max(500.0)
    } else if students <= 150.0 {
        (students * 12.0).max(1000.0)
    } else {
        (students * 10.0).max(1500.0)
    }
}

impl Profitability {
    pub fn compute(students: u32, ticket: u32) -> Self {
        let gross_revenue = f64::from(students) * f64::from(ticket);
        let commission = gross_revenue * COMMISSION_RATE;
        let operational_costs = operational_costs(students);
        let net_profit = commission - operational_costs;
        Self {
            gross_revenue,
            commission,
            operational_costs,
            net_profit,
            annual_profit: net_profit * 12.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Inputs {
    size: PartnershipSize,
    students: u32,
    ticket: u32,
    started: bool,
}

impl Default for Inputs {
    fn default() -> Self {
        let size = PartnershipSize::Custom;
        Self {
            size,
            students: size.student_range().2,
            ticket: TICKET_OPTIONS[1],
            started: false,
        }
    }
}

fn track_change(analytics: &AnalyticsHandle, inputs: &Inputs, input_name: &str, input_value: String) {
    if !inputs.started {
        analytics.track(AnalyticsEvent::new("calculator_start", "tools").with("tool_name", TOOL_NAME));
    }
    analytics.track(
        AnalyticsEvent::new("calculator_input", "tools")
            .with("tool_name", TOOL_NAME)
            .with("input_name", input_name)
            .with("input_value", input_value),
    );
    let result = Profitability::compute(inputs.students, inputs.ticket);
    analytics.track(
        AnalyticsEvent::new("calculator_use", "tools")
            .with("student_count", inputs.students)
            .with("ticket_value", inputs.ticket)
            .with("net_profit", result.net_profit),
    );
}

#[function_component(ProfitabilityCalculator)]
pub fn profitability_calculator() -> Html {
    let inputs = use_state(Inputs::default);
    let analytics = use_analytics();
    let result = Profitability::compute(inputs.students, inputs.ticket);
    let (min, max, _) = inputs.size.student_range();

    let on_students = {
        let inputs = inputs.clone();
        let analytics = analytics.clone();
        Callback::from(move |e: InputEvent| {
            let slider: HtmlInputElement = e.target_unchecked_into();
            let students = slider.value().parse().unwrap_or(inputs.students);
            let next = Inputs { students, ..*inputs };
            track_change(&analytics, &next, "student-count", students.to_string());
            inputs.set(Inputs { started: true, ..next });
        })
    };
    let on_size = {
        let inputs = inputs.clone();
        let analytics = analytics.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let size = PartnershipSize::parse(&select.value());
            let next = Inputs {
                size,
                students: size.student_range().2,
                ..*inputs
            };
            track_change(&analytics, &next, "partnership-type", size.as_str().to_string());
            inputs.set(Inputs { started: true, ..next });
        })
    };
    let on_ticket = {
        let inputs = inputs.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let ticket = select.value().parse().unwrap_or(inputs.ticket);
            let next = Inputs { ticket, ..*inputs };
            track_change(&analytics, &next, "ticket-price", ticket.to_string());
            inputs.set(Inputs { started: true, ..next });
        })
    };

    let row = |label: &str, id: &str, value: f64| {
        html! {
            <div class="flex justify-between py-2 border-b border-gray-100">
                <span class="text-gray-600">{label.to_string()}</span>
                <span id={id.to_string()} class="font-semibold">{format_brl(value)}</span>
            </div>
        }
    };

    html! {
        <section id="simulacao" class="py-20 bg-gray-50">
            <div class="container mx-auto px-4 grid md:grid-cols-2 gap-12">
                <div>
                    <h2 class="text-4xl font-bold text-educa-blue mb-8">{"Simule seus ganhos"}</h2>
                    <label class="block font-semibold mb-2" for="partnership-type">{"Porte da parceria"}</label>
                    <select id="partnership-type" class="w-full border rounded-lg px-4 py-3 mb-6" onchange={on_size}>
                        { for [PartnershipSize::Custom, PartnershipSize::Small, PartnershipSize::Medium, PartnershipSize::Large].iter().map(|size| {
                            let label = match size {
                                PartnershipSize::Small => "Pequeno (20 a 50 alunos)",
                                PartnershipSize::Medium => "Médio (50 a 150 alunos)",
                                PartnershipSize::Large => "Grande (150 a 300 alunos)",
                                PartnershipSize::Custom => "Personalizado",
                            };
                            html! { <option value={size.as_str()} selected={*size == inputs.size}>{label}</option> }
                        }) }
                    </select>
                    <label class="block font-semibold mb-2" for="student-count">
                        {"Alunos por mês: "}<span id="student-display">{inputs.students}</span>
                    </label>
                    <input id="student-count" type="range" class="w-full mb-6"
                        min={min.to_string()} max={max.to_string()} value={inputs.students.to_string()}
                        oninput={on_students} />
                    <label class="block font-semibold mb-2" for="ticket-price">{"Ticket médio"}</label>
                    <select id="ticket-price" class="w-full border rounded-lg px-4 py-3" onchange={on_ticket}>
                        { for TICKET_OPTIONS.iter().map(|ticket| html! {
                            <option value={ticket.to_string()} selected={*ticket == inputs.ticket}>{format_brl(f64::from(*ticket))}</option>
                        }) }
                    </select>
                </div>
                <div class="bg-white rounded-2xl shadow-lg p-8">
                    { row("Faturamento bruto", "gross-revenue", result.gross_revenue) }
                    { row("Sua comissão (40%)", "commission", result.commission) }
                    { row("Custos operacionais", "operational-costs", result.operational_costs) }
                    { row("Lucro líquido mensal", "net-profit", result.net_profit) }
                    { row("Lucro anual", "annual-profit", result.annual_profit) }
                </div>
            </div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_ranges_and_unknown_values() {
        assert_eq!(PartnershipSize::parse("medium").student_range(), (50, 150, 100));
        assert_eq!(PartnershipSize::parse("enterprise"), PartnershipSize::Custom);
        assert_eq!(PartnershipSize::Custom.student_range(), (20, 300, 50));
    }

    #[test]
    fn cost_brackets_have_floors() {
        assert_eq!(operational_costs(20), 500.0);
        assert_eq!(operational_costs(50), 750.0);
        assert_eq!(operational_costs(60), 1000.0);
        assert_eq!(operational_costs(150), 1800.0);
        assert_eq!(operational_costs(151), 1510.0);
        assert_eq!(operational_costs(300), 3000.0);
    }

    #[test]
    fn profit_for_a_medium_partner() {
        let result = Profitability::compute(100, 200);
        assert_eq!(result.gross_revenue, 20_000.0);
        assert_eq!(result.commission, 8_000.0);
        assert_eq!(result.operational_costs, 1_200.0);
        assert_eq!(result.net_profit, 6_800.0);
        assert_eq!(result.annual_profit, 81_600.0);
    }

    #[test]
    fn small_partners_can_lose_money() {
        let result = Profitability::compute(20, 50);
        assert!(result.net_profit < 0.0);
        assert_eq!(format_brl(result.net_profit), "-R$ 100,00");
    }
}
