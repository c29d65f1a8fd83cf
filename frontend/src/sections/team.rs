use std::collections::BTreeSet;

use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_hooks::prelude::*;

use crate::modal::{use_modal, Modal, ModalEvent};

pub const COUNTER_DURATION_MS: u32 = 2_000;
const COUNTER_FRAME_MS: u32 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct TeamMember {
    pub id: u32,
    pub name: &'static str,
    pub role: &'static str,
    pub photo: &'static str,
    pub skills: &'static [&'static str],
    pub hobbies: &'static str,
    pub favorite_music: &'static str,
    pub favorite_movie: &'static str,
    pub quote: &'static str,
    pub email: &'static str,
    pub experience: &'static str,
}

pub const TEAM: &[TeamMember] = &[
    TeamMember {
        id: 1,
        name: "Carolina Mendes",
        role: "Diretora de Expansão",
        photo: "/assets/equipe/carolina.jpg",
        skills: &["Planejamento Estratégico", "Gestão de Parcerias", "Negociação"],
        hobbies: "Corrida e fotografia",
        favorite_music: "Águas de Março - Elis Regina",
        favorite_movie: "Central do Brasil",
        quote: "Cada polo novo é uma cidade com mais acesso à educação.",
        email: "carolina@educamais.com.br",
        experience: "12+ anos",
    },
    TeamMember {
        id: 2,
        name: "Bruno Albuquerque",
        role: "Consultor de Expansão",
        photo: "/assets/equipe/bruno.jpg",
        skills: &["Gestão de Tráfego", "Análise de Dados", "CRM"],
        hobbies: "Futebol e jogos de tabuleiro",
        favorite_music: "Tempo Perdido - Legião Urbana",
        favorite_movie: "O Auto da Compadecida",
        quote: "Dado bom é dado que vira decisão.",
        email: "bruno@educamais.com.br",
        experience: "8+ anos",
    },
    TeamMember {
        id: 3,
        name: "Juliana Ferraz",
        role: "Coordenadora de Marketing",
        photo: "/assets/equipe/juliana.jpg",
        skills: &["Design", "Copywriting", "Foto e Vídeo"],
        hobbies: "Cinema e culinária",
        favorite_music: "Trem-Bala - Ana Vilela",
        favorite_movie: "Que Horas Ela Volta?",
        quote: "Uma boa história abre mais portas que qualquer anúncio.",
        email: "juliana@educamais.com.br",
        experience: "7+ anos",
    },
    TeamMember {
        id: 4,
        name: "Rodrigo Tavares",
        role: "Consultor de Vendas Sênior",
        photo: "/assets/equipe/rodrigo.jpg",
        skills: &["Vendas Consultivas", "Negociação", "Apresentações"],
        hobbies: "Ciclismo e teatro",
        favorite_music: "Como Nossos Pais - Belchior",
        favorite_movie: "Cidade de Deus",
        quote: "Vender é resolver problemas, não empurrar produtos.",
        email: "rodrigo@educamais.com.br",
        experience: "10+ anos",
    },
];

/// Case-insensitive substring search over everything shown about a member.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TeamFilter {
    term: String,
}

impl TeamFilter {
    pub fn new(term: &str) -> Self {
        Self {
            term: term.trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }

    pub fn matches(&self, member: &TeamMember) -> bool {
        if self.is_empty() {
            return true;
        }
        let mut fields = vec![member.name, member.role];
        fields.extend_from_slice(member.skills);
        fields.extend([member.hobbies, member.favorite_music, member.favorite_movie, member.email]);
        fields.join(" ").to_lowercase().contains(&self.term)
    }

    pub fn apply<'a>(&self, members: &'a [TeamMember]) -> Vec<&'a TeamMember> {
        members.iter().filter(|m| self.matches(m)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamStats {
    pub members: u32,
    /// Distinct skills across the whole team.
    pub skills: u32,
}

impl TeamStats {
    pub fn of(members: &[TeamMember]) -> Self {
        let skills: BTreeSet<&str> = members.iter().flat_map(|m| m.skills.iter().copied()).collect();
        Self {
            members: members.len() as u32,
            skills: skills.len() as u32,
        }
    }
}

/// Value shown `elapsed_ms` into a linear count-up to `target`.
pub fn counter_value(target: u32, elapsed_ms: u32, duration_ms: u32) -> u32 {
    if duration_ms == 0 || elapsed_ms >= duration_ms {
        return target;
    }
    (u64::from(target) * u64::from(elapsed_ms) / u64::from(duration_ms)) as u32
}

#[derive(Properties, PartialEq)]
struct CounterProps {
    target: u32,
    label: AttrValue,
}

#[function_component(AnimatedCounter)]
fn animated_counter(props: &CounterProps) -> Html {
    let elapsed = use_state(|| 0u32);
    let running = *elapsed < COUNTER_DURATION_MS;
    {
        let elapsed = elapsed.clone();
        use_interval(
            move || elapsed.set((*elapsed + COUNTER_FRAME_MS).min(COUNTER_DURATION_MS)),
            if running { COUNTER_FRAME_MS } else { 0 },
        );
    }

    html! {
        <div class="text-center">
            <span class="block text-4xl font-extrabold text-educa-pink">
                {counter_value(props.target, *elapsed, COUNTER_DURATION_MS)}
            </span>
            <span class="text-gray-600">{props.label.clone()}</span>
        </div>
    }
}

fn member_card(member: &TeamMember, index: usize, onclick: Callback<MouseEvent>) -> Html {
    let delay = format!("animation-delay: {}ms", (index * 100).min(500));
    html! {
        <div class="team-card bg-white rounded-2xl shadow-lg overflow-hidden cursor-pointer animate-scale-in h-[400px]"
            style={delay} data-member-id={member.id.to_string()} {onclick}>
            <div class="team-card-inner">
                <img src={member.photo} alt={member.name} class="team-card-image" />
                <div class="team-card-overlay">
                    <h3 class="text-2xl font-bold mb-1">{member.name}</h3>
                    <p class="text-base">{member.role}</p>
                    <span class="email text-sm opacity-80 mb-4">{member.email}</span>
                    <button class="w-full bg-educa-pink text-white py-2 rounded-lg">
                        <i class="fas fa-eye mr-2"></i>{"Ver Detalhes"}
                    </button>
                </div>
            </div>
        </div>
    }
}

fn member_details(member: &TeamMember) -> Html {
    let details = [
        ("fa-heart", "Hobbies", member.hobbies),
        ("fa-music", "Música Favorita", member.favorite_music),
        ("fa-film", "Filme Favorito", member.favorite_movie),
    ];
    html! {
        <div class="member-details">
            <img src={member.photo} alt={member.name} class="w-full h-64 object-cover rounded-2xl mb-4" />
            <p class="text-xl text-gray-700">{member.role}</p>
            <span class="inline-block bg-educa-blue/10 rounded-full px-3 py-1 text-sm mt-2">{member.experience}</span>
            <blockquote class="bg-educa-pink/10 rounded-2xl p-6 my-6 text-center italic text-educa-blue">
                {format!("\"{}\"", member.quote)}
            </blockquote>
            <h4 class="text-lg font-bold text-educa-blue mb-3">{"Habilidades Técnicas"}</h4>
            <div class="flex flex-wrap gap-3 mb-6">
                { for member.skills.iter().map(|skill| html! {
                    <span class="skill-tag text-white px-4 py-2 rounded-full">{*skill}</span>
                }) }
            </div>
            <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                { for details.iter().map(|(icon, title, value)| html! {
                    <div class="bg-gray-50 rounded-2xl p-4">
                        <h5 class="font-bold text-educa-blue mb-2"><i class={classes!("fas", *icon, "mr-2")}></i>{*title}</h5>
                        <p>{*value}</p>
                    </div>
                }) }
                <div class="bg-gray-50 rounded-2xl p-4">
                    <h5 class="font-bold text-educa-blue mb-2"><i class="fas fa-envelope mr-2"></i>{"Contato"}</h5>
                    <a href={format!("mailto:{}", member.email)} class="text-educa-pink break-all">{member.email}</a>
                </div>
            </div>
        </div>
    }
}

/// "Quem somos": searchable team grid with a details modal per member.
#[function_component(TeamSection)]
pub fn team_section() -> Html {
    let query = use_state(String::new);
    let selected = use_state(|| None::<u32>);
    let on_closed = {
        let selected = selected.clone();
        Callback::from(move |_: ()| selected.set(None))
    };
    let member_modal = use_modal("memberModal", on_closed);
    let stats = TeamStats::of(TEAM);

    let oninput = {
        let query = query.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            query.set(input.value());
        })
    };
    let clear = {
        let query = query.clone();
        Callback::from(move |_: MouseEvent| query.set(String::new()))
    };

    let visible = TeamFilter::new(&query).apply(TEAM);
    let current = (*selected).and_then(|id| TEAM.iter().find(|m| m.id == id));

    html! {
        <section id="quem-somos" class="py-20 bg-gray-50">
            <div class="container mx-auto px-4">
                <h2 class="text-4xl font-bold text-center text-educa-blue mb-4">{"Quem somos"}</h2>
                <div class="grid grid-cols-2 gap-8 max-w-md mx-auto mb-10">
                    <AnimatedCounter target={stats.members} label="pessoas na equipe" />
                    <AnimatedCounter target={stats.skills} label="habilidades" />
                </div>
                <div class="flex max-w-xl mx-auto mb-10 space-x-2">
                    <input id="searchInput" type="search" class="form-input flex-1 rounded-lg border border-gray-300 px-4 py-3"
                        placeholder="Buscar por nome, cargo ou habilidade" value={(*query).clone()} {oninput} />
                    <button class="px-4 rounded-lg border border-gray-300" onclick={clear.clone()}>{"Limpar"}</button>
                </div>
                if visible.is_empty() {
                    <div id="noResultsMessage" class="text-center text-gray-600">
                        <p class="mb-4">{"Nenhum membro encontrado."}</p>
                        <button class="text-educa-pink underline" onclick={clear}>{"Limpar pesquisa"}</button>
                    </div>
                } else {
                    <div id="teamGrid" class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-8">
                        { for visible.iter().enumerate().map(|(index, member)| {
                            let onclick = {
                                let selected = selected.clone();
                                let dispatch = member_modal.dispatch.clone();
                                let id = member.id;
                                Callback::from(move |_: MouseEvent| {
                                    selected.set(Some(id));
                                    dispatch.emit(ModalEvent::Trigger);
                                })
                            };
                            member_card(member, index, onclick)
                        }) }
                    </div>
                }
            </div>
            <Modal id="memberModal" title={current.map_or("", |m| m.name)} handle={member_modal.clone()}>
                { current.map_or_else(|| html! {}, member_details) }
            </Modal>
        </section>
    }
}
