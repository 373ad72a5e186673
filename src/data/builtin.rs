use crate::content::schema::CONTENT_SCHEMA_VERSION;
use crate::data::quests::{
    ChoiceDef, EndingTexts, IncorrectPolicy, QuestCatalog, QuestDefinition, StageDef, VitalSpec,
};
use crate::data::zones::{ZoneCatalog, ZoneDef, ZoneDifficulty};

/// Zones shipped with the engine. Mirrored by `assets/data/zones_core.json`.
pub fn builtin_zone_catalog() -> ZoneCatalog {
    ZoneCatalog {
        schema_version: CONTENT_SCHEMA_VERSION,
        zones: vec![
            zone(
                "terra-dome",
                "Terra Dome",
                "ecology",
                ZoneDifficulty::Intro,
                "A sealed biosphere limping along on failing life support.",
            ),
            zone(
                "signal-grid",
                "Signal Grid",
                "cybersecurity",
                ZoneDifficulty::Standard,
                "A regional exchange where every alert is a clock running down.",
            ),
            zone(
                "dust-road",
                "Dust Road",
                "logistics",
                ZoneDifficulty::Advanced,
                "Trade routes across the salt wastes, priced in water and nerve.",
            ),
            zone(
                "lost-meridian",
                "Lost Meridian",
                "history",
                ZoneDifficulty::Standard,
                "Dig sites and sealed tombs along a drowned river valley.",
            ),
        ],
    }
}

/// Quests shipped with the engine. Mirrored by `assets/data/quests_core.json`.
pub fn builtin_quest_catalog() -> QuestCatalog {
    QuestCatalog {
        schema_version: CONTENT_SCHEMA_VERSION,
        quests: vec![
            verdant_biosphere(),
            firewall_triage(),
            caravan_crossroads(),
            sarcophagus_cipher(),
        ],
    }
}

fn zone(id: &str, title: &str, subject: &str, difficulty: ZoneDifficulty, blurb: &str) -> ZoneDef {
    ZoneDef {
        id: id.to_string(),
        title: title.to_string(),
        subject: subject.to_string(),
        difficulty,
        blurb: blurb.to_string(),
    }
}

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn vital(id: &str, start: i64, max: i64) -> VitalSpec {
    VitalSpec {
        id: id.to_string(),
        start,
        min: 0,
        max,
        target: None,
        critical_floor: None,
    }
}

fn stage(id: &str, prompt: &str, choices: Vec<ChoiceDef>) -> StageDef {
    StageDef {
        id: id.to_string(),
        prompt: prompt.to_string(),
        requires: Vec::new(),
        effects: Vec::new(),
        choices,
    }
}

fn choice(id: &str, label: &str) -> ChoiceDef {
    ChoiceDef {
        id: id.to_string(),
        label: label.to_string(),
        cost: 0,
        requires: Vec::new(),
        effects: Vec::new(),
        feedback: None,
        next: None,
        correct: None,
    }
}

fn answer(id: &str, label: &str, correct: bool, feedback: &str) -> ChoiceDef {
    ChoiceDef {
        correct: Some(correct),
        feedback: Some(feedback.to_string()),
        ..choice(id, label)
    }
}

/// Open-ended restoration hub. No budget; the player loops on one stage
/// until every gauge meets its target or a gauge collapses.
fn verdant_biosphere() -> QuestDefinition {
    let restored = |spec: VitalSpec| VitalSpec {
        target: Some(75),
        critical_floor: Some(10),
        ..spec
    };
    QuestDefinition {
        id: "verdant-biosphere".to_string(),
        title: "Verdant Biosphere".to_string(),
        zone: "terra-dome".to_string(),
        intro: "The dome's life support is failing on four fronts at once. \
                Bring every gauge back above the green line."
            .to_string(),
        vitals: vec![
            restored(vital("water", 30, 100)),
            restored(vital("air", 40, 100)),
            restored(vital("plant", 25, 100)),
            restored(vital("biodiversity", 20, 100)),
        ],
        flags: Vec::new(),
        entry_stage: "control-room".to_string(),
        stages: vec![stage(
            "control-room",
            "Dome systems hum around the central console. Four gauges crawl \
             along the low end of their dials.",
            vec![
                ChoiceDef {
                    effects: list(&["water:+25"]),
                    next: Some("control-room".to_string()),
                    ..choice("install-filter", "Install a reclaimed-water filter")
                },
                ChoiceDef {
                    effects: list(&["plant:+20"]),
                    next: Some("control-room".to_string()),
                    ..choice("seed-planters", "Sow hardy seedlings in the planters")
                },
                ChoiceDef {
                    effects: list(&["biodiversity:+20", "plant:+10"]),
                    next: Some("control-room".to_string()),
                    ..choice("release-pollinators", "Release the pollinator colony")
                },
                ChoiceDef {
                    effects: list(&["air:+20", "water:-5"]),
                    next: Some("control-room".to_string()),
                    ..choice("cycle-scrubbers", "Cycle the air scrubbers")
                },
                ChoiceDef {
                    effects: list(&["reveal:acidic-soil|fungal-bloom"]),
                    feedback: Some("The probe flags a contaminant in the beds.".to_string()),
                    next: Some("control-room".to_string()),
                    ..choice("soil-diagnostic", "Run a soil diagnostic")
                },
                ChoiceDef {
                    requires: list(&["flag.acidic-soil"]),
                    effects: list(&["plant:+30", "water:-10", "flag.acidic-soil:clear"]),
                    feedback: Some("The lime neutralizes the acid beds.".to_string()),
                    next: Some("control-room".to_string()),
                    ..choice("lime-dose", "Dose the beds with crushed lime")
                },
                ChoiceDef {
                    requires: list(&["flag.fungal-bloom"]),
                    effects: list(&["plant:+25", "biodiversity:-5", "flag.fungal-bloom:clear"]),
                    feedback: Some("The bloom recedes overnight.".to_string()),
                    next: Some("control-room".to_string()),
                    ..choice("fungicide-mist", "Mist the beds with fungicide")
                },
                ChoiceDef {
                    effects: list(&["water:+15", "plant:-30", "biodiversity:-20"]),
                    feedback: Some(
                        "The beds drink it in. Then the leaves start to spot.".to_string(),
                    ),
                    next: Some("control-room".to_string()),
                    ..choice("dump-greywater", "Dump untreated greywater into the beds")
                },
            ],
        )],
        budget_vital: None,
        score_target: None,
        on_incorrect: IncorrectPolicy::Retry,
        incorrect_penalty: 1,
        endings: EndingTexts {
            victory: "The dome breathes on its own. Every gauge holds green.".to_string(),
            collapse: "One gauge needles to zero and the cascade follows. The dome goes dark."
                .to_string(),
            exhausted: "The reserves run dry.".to_string(),
            stranded: "Nothing left to try.".to_string(),
        },
    }
}

/// Linear incident-response drill. Wrong calls burn analyst cycles on top
/// of their own fallout; three right calls clear the incident.
fn firewall_triage() -> QuestDefinition {
    QuestDefinition {
        id: "firewall-triage".to_string(),
        title: "Firewall Triage".to_string(),
        zone: "signal-grid".to_string(),
        intro: "Three alerts, one night shift, and a fixed pool of analyst \
                cycles. Spend them on the right calls."
            .to_string(),
        vitals: vec![
            vital("cycles", 12, 12),
            VitalSpec {
                critical_floor: Some(20),
                ..vital("integrity", 60, 100)
            },
        ],
        flags: Vec::new(),
        entry_stage: "port-sweep".to_string(),
        stages: vec![
            stage(
                "port-sweep",
                "A host none of your inventory knows is sweeping the exchange's ports.",
                vec![
                    ChoiceDef {
                        cost: 2,
                        next: Some("invoice-lure".to_string()),
                        ..answer(
                            "blackhole-route",
                            "Blackhole the source at the border router",
                            true,
                            "The sweep dies at the edge.",
                        )
                    },
                    ChoiceDef {
                        effects: list(&["integrity:-15"]),
                        ..answer(
                            "watch-and-wait",
                            "Log it and keep watching",
                            false,
                            "By morning the host has mapped the whole subnet.",
                        )
                    },
                    ChoiceDef {
                        cost: 4,
                        effects: list(&["integrity:-10"]),
                        ..answer(
                            "mass-reboot",
                            "Reboot every exchange server",
                            false,
                            "Ten minutes of downtime, and the sweep resumes.",
                        )
                    },
                ],
            ),
            stage(
                "invoice-lure",
                "Accounting forwards an invoice no vendor sent.",
                vec![
                    ChoiceDef {
                        cost: 2,
                        next: Some("emergency-patch".to_string()),
                        ..answer(
                            "quarantine-message",
                            "Quarantine the message and purge delivered copies",
                            true,
                            "Thirty copies, caught before a single open.",
                        )
                    },
                    ChoiceDef {
                        effects: list(&["integrity:-25"]),
                        ..answer(
                            "open-on-desktop",
                            "Open the attachment on an accountant's desktop",
                            false,
                            "The macro beacons out before the window closes.",
                        )
                    },
                    ChoiceDef {
                        cost: 1,
                        effects: list(&["integrity:-5"]),
                        ..answer(
                            "all-staff-alert",
                            "Mass-mail a warning to every inbox",
                            false,
                            "Panicked replies bury the real reports.",
                        )
                    },
                ],
            ),
            stage(
                "emergency-patch",
                "A critical advisory lands for the web tier, exploit attached.",
                vec![
                    ChoiceDef {
                        cost: 3,
                        ..answer(
                            "canary-rollout",
                            "Patch one canary node, then roll forward",
                            true,
                            "The canary holds. The fleet follows.",
                        )
                    },
                    ChoiceDef {
                        cost: 5,
                        effects: list(&["integrity:-10"]),
                        ..answer(
                            "patch-blind",
                            "Force-patch the fleet at once",
                            false,
                            "Two nodes wedge on reboot.",
                        )
                    },
                    ChoiceDef {
                        effects: list(&["integrity:-10"]),
                        ..answer(
                            "await-vendor",
                            "Wait for the vendor's blessed build",
                            false,
                            "The exploit goes public first.",
                        )
                    },
                ],
            ),
        ],
        budget_vital: Some("cycles".to_string()),
        score_target: Some(3),
        on_incorrect: IncorrectPolicy::PenalizeResource,
        incorrect_penalty: 2,
        endings: EndingTexts {
            victory: "Three clean calls. The night log reads like a training tape.".to_string(),
            collapse: "Too many bad calls. The exchange drops off the grid.".to_string(),
            exhausted: "The cycle pool hits zero with alerts still open.".to_string(),
            stranded: "The shift ends with the incident unresolved.".to_string(),
        },
    }
}

/// Branching desert run. Supplies drain a little every leg and pay for the
/// better roads; a hired scout unlocks the best one.
fn caravan_crossroads() -> QuestDefinition {
    QuestDefinition {
        id: "caravan-crossroads".to_string(),
        title: "Caravan Crossroads".to_string(),
        zone: "dust-road".to_string(),
        intro: "Five legs of bad road between you and the city gates. \
                Supplies pay for shortcuts; morale pays for everything else."
            .to_string(),
        vitals: vec![
            vital("supplies", 10, 20),
            VitalSpec {
                critical_floor: Some(15),
                ..vital("morale", 50, 100)
            },
            VitalSpec {
                target: Some(100),
                ..vital("progress", 0, 100)
            },
        ],
        flags: Vec::new(),
        entry_stage: "trailhead".to_string(),
        stages: vec![
            stage(
                "trailhead",
                "Dawn at the trailhead. Drovers check loads while the heat builds.",
                vec![
                    ChoiceDef {
                        cost: 3,
                        effects: list(&["flag.scout-map:set", "morale:+5"]),
                        feedback: Some(
                            "She sketches a pass the toll men do not watch.".to_string(),
                        ),
                        next: Some("fork".to_string()),
                        ..choice("hire-scout", "Hire the scout sizing up your wagons")
                    },
                    ChoiceDef {
                        effects: list(&["progress:+5"]),
                        next: Some("fork".to_string()),
                        ..choice("set-out", "Set out with the route you know")
                    },
                ],
            ),
            StageDef {
                effects: list(&["supplies:-1"]),
                ..stage(
                    "fork",
                    "By the red mesa the road splits three ways.",
                    vec![
                        ChoiceDef {
                            cost: 3,
                            effects: list(&["progress:+30", "morale:-5"]),
                            next: Some("springs".to_string()),
                            ..choice("canyon-road", "The canyon road, shaded and slow")
                        },
                        ChoiceDef {
                            cost: 1,
                            effects: list(&["progress:+25", "morale:-15"]),
                            next: Some("springs".to_string()),
                            ..choice("dune-crossing", "Straight across the dunes")
                        },
                        ChoiceDef {
                            requires: list(&["flag.scout-map"]),
                            cost: 1,
                            effects: list(&["progress:+40", "morale:+5"]),
                            feedback: Some("Cool rock and no tolls.".to_string()),
                            next: Some("springs".to_string()),
                            ..choice("smugglers-pass", "The pass from the scout's sketch")
                        },
                    ],
                )
            },
            StageDef {
                effects: list(&["supplies:-1"]),
                ..stage(
                    "springs",
                    "Hidden springs. A day lost, or water gained.",
                    vec![
                        ChoiceDef {
                            effects: list(&["supplies:+5", "morale:+10"]),
                            next: Some("flats".to_string()),
                            ..choice("rest-and-refill", "Camp, rest, refill every skin")
                        },
                        ChoiceDef {
                            effects: list(&["progress:+15", "morale:-10"]),
                            next: Some("flats".to_string()),
                            ..choice("night-march", "March on through the night")
                        },
                    ],
                )
            },
            StageDef {
                effects: list(&["supplies:-1"]),
                ..stage(
                    "flats",
                    "White salt to the horizon. A rival caravan closes from the south.",
                    vec![
                        ChoiceDef {
                            cost: 2,
                            effects: list(&["progress:+10", "morale:+10"]),
                            next: Some("gates".to_string()),
                            ..choice("barter-passage", "Barter their water for your shade cloth")
                        },
                        ChoiceDef {
                            effects: list(&["progress:+20", "morale:-15"]),
                            next: Some("gates".to_string()),
                            ..choice("force-pace", "Outpace them across the flats")
                        },
                    ],
                )
            },
            StageDef {
                effects: list(&["supplies:-1"]),
                ..stage(
                    "gates",
                    "The city gates rise out of the haze.",
                    vec![
                        ChoiceDef {
                            requires: list(&["morale >= 40"]),
                            effects: list(&["progress:+40"]),
                            feedback: Some("The wardens wave the column through.".to_string()),
                            ..choice("triumphant-entry", "Enter in good order, banners up")
                        },
                        ChoiceDef {
                            effects: list(&["progress:+25", "morale:-5"]),
                            ..choice("beggars-gate", "Slip in by the beggars' gate")
                        },
                    ],
                )
            },
        ],
        budget_vital: Some("supplies".to_string()),
        score_target: None,
        on_incorrect: IncorrectPolicy::Retry,
        incorrect_penalty: 1,
        endings: EndingTexts {
            victory: "The full load reaches the market square before the heat of noon.".to_string(),
            collapse: "The drovers turn back at the next well. The run is over.".to_string(),
            exhausted: "The last waterskin goes flat a day short of the walls.".to_string(),
            stranded: "The caravan limps in too light to cover its debts.".to_string(),
        },
    }
}

/// Four sealed glyph rows, one lantern. Studying is free but the oil is not.
fn sarcophagus_cipher() -> QuestDefinition {
    let drain = list(&["lantern-oil:-1"]);
    QuestDefinition {
        id: "sarcophagus-cipher".to_string(),
        title: "Sarcophagus Cipher".to_string(),
        zone: "lost-meridian".to_string(),
        intro: "Four glyph rows seal the inner door, and the lantern burns \
                lower with every attempt."
            .to_string(),
        vitals: vec![vital("lantern-oil", 10, 10)],
        flags: Vec::new(),
        entry_stage: "riddle-sun".to_string(),
        stages: vec![
            StageDef {
                effects: drain.clone(),
                ..stage(
                    "riddle-sun",
                    "The first row shows a falcon crowned with a disc. Which name \
                     commands the sun glyph?",
                    vec![
                        ChoiceDef {
                            next: Some("riddle-sun".to_string()),
                            feedback: Some(
                                "Every dawn scene crowns the same falcon.".to_string(),
                            ),
                            ..choice("study-frieze", "Study the frieze by lantern light")
                        },
                        ChoiceDef {
                            next: Some("riddle-river".to_string()),
                            ..answer(
                                "name-ra",
                                "Name the falcon: Ra",
                                true,
                                "Stone grinds. The first row turns.",
                            )
                        },
                        answer(
                            "name-apophis",
                            "Name the serpent: Apophis",
                            false,
                            "The serpent devours the sun. The row does not move.",
                        ),
                    ],
                )
            },
            StageDef {
                effects: drain.clone(),
                ..stage(
                    "riddle-river",
                    "The second row: a river fattened by flood. What does the \
                     flood leave in its wake?",
                    vec![
                        ChoiceDef {
                            next: Some("riddle-river".to_string()),
                            feedback: Some(
                                "Reliefs show farmers praising the black earth.".to_string(),
                            ),
                            ..choice("study-banks", "Study the harvest reliefs")
                        },
                        ChoiceDef {
                            next: Some("riddle-scale".to_string()),
                            ..answer(
                                "answer-silt",
                                "Black silt for the fields",
                                true,
                                "The second row turns.",
                            )
                        },
                        answer(
                            "answer-salt",
                            "Salt from the drowned sea",
                            false,
                            "Salt kills the field. The row stays shut.",
                        ),
                    ],
                )
            },
            StageDef {
                effects: drain.clone(),
                ..stage(
                    "riddle-scale",
                    "The third row shows the weighing of a heart. What sits on \
                     the other pan?",
                    vec![
                        ChoiceDef {
                            next: Some("riddle-scale".to_string()),
                            feedback: Some(
                                "A kneeling scribe balances a single plume.".to_string(),
                            ),
                            ..choice("study-judgement", "Study the judgement scene")
                        },
                        ChoiceDef {
                            next: Some("riddle-door".to_string()),
                            ..answer(
                                "answer-feather",
                                "A single feather",
                                true,
                                "The third row turns.",
                            )
                        },
                        answer(
                            "answer-gold",
                            "A bar of tomb gold",
                            false,
                            "The pan crashes down. The row stays shut.",
                        ),
                    ],
                )
            },
            StageDef {
                effects: drain,
                ..stage(
                    "riddle-door",
                    "The last row is empty save a mouth glyph. What opens the door?",
                    vec![
                        answer(
                            "speak-name",
                            "Speak the builder's name aloud",
                            true,
                            "The name echoes. The seal parts.",
                        ),
                        answer(
                            "force-door",
                            "Force the door with the pry bar",
                            false,
                            "The bar bends. The mouth glyph waits.",
                        ),
                    ],
                )
            },
        ],
        budget_vital: Some("lantern-oil".to_string()),
        score_target: Some(4),
        on_incorrect: IncorrectPolicy::Retry,
        incorrect_penalty: 1,
        endings: EndingTexts {
            victory: "The inner door swings open on its first hinge in three \
                      thousand years."
                .to_string(),
            collapse: "The dig master calls the descent off.".to_string(),
            exhausted: "The lantern gutters out in the dark of the shaft.".to_string(),
            stranded: "The rows stand sealed.".to_string(),
        },
    }
}
