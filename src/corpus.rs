//! Built-in sample corpus, substituted only when every configured source
//! fails or times out so the pipeline can still produce a map.

use crate::models::RawOpinion;

pub const FALLBACK_SOURCE: &str = "sample";

/// (text, score) pairs spanning a few recognizable debate topics. Scores are
/// invented but shaped like real vote counts, including negative ones.
const SAMPLES: &[(&str, i64)] = &[
    (
        "Remote work made my team more productive, not less. Commuting was the real distraction all along.",
        412,
    ),
    (
        "Hybrid schedules are the worst of both worlds. You keep the office lease and lose the focus time.",
        87,
    ),
    (
        "I miss whiteboard sessions. Video calls are fine for status updates but terrible for actual design work.",
        153,
    ),
    (
        "Electric cars are great until you live in an apartment with street parking and nowhere to charge overnight.",
        298,
    ),
    (
        "The charging network argument is stale. I road-tripped 2000 miles last summer without a single problem.",
        176,
    ),
    (
        "Batteries degrade, sure, but so do engines. Nobody prices a ten-year-old gas car like it is new either.",
        -12,
    ),
    (
        "Social media did not ruin discourse, it just made the discourse we always had impossible to ignore.",
        531,
    ),
    (
        "Algorithmic feeds reward outrage. Chronological timelines were slower but they were honest.",
        344,
    ),
    (
        "Quitting the big platforms was the best mental health decision I made this decade.",
        808,
    ),
    (
        "AI tools are calculators for words. Banning them in schools repeats the mistake we made with calculators.",
        265,
    ),
    (
        "Everyone demos the happy path. Ask the chatbot something at the edge of its training and watch it improvise facts.",
        190,
    ),
    (
        "My job did not disappear because of automation, it just quietly became reviewing what the machine produced.",
        99,
    ),
    (
        "Rent control sounds compassionate but every city that tried it ended up with less housing, not cheaper housing.",
        -45,
    ),
    (
        "We do not have a housing shortage, we have a shortage of housing where people actually want to live.",
        387,
    ),
    (
        "Zoning reform is the rare policy where economists on both ends of the spectrum mostly agree.",
        142,
    ),
    (
        "Four-day work weeks keep passing every trial and somehow we still treat them as a fringe idea.",
        622,
    ),
    (
        "Productivity metrics from four-day-week pilots are self-reported. Of course people say it works.",
        58,
    ),
    (
        "Public transit will never win as long as we measure its subsidy and ignore the subsidy roads get.",
        276,
    ),
    (
        "I want to like the bus, but a 20 minute drive being a 75 minute ride is not a culture war issue, it is math.",
        330,
    ),
    (
        "Nuclear is the only proven low-carbon baseload we have and we spent thirty years being scared of it.",
        451,
    ),
    (
        "Solar plus storage gets cheaper every single year. Betting against that curve has been wrong for a decade.",
        389,
    ),
    (
        "Streaming was supposed to kill cable bundles and now I pay for six bundles with worse search.",
        714,
    ),
    (
        "Physical media is quietly coming back because people noticed you do not own anything you stream.",
        203,
    ),
    (
        "College is still worth it on average, but the averages hide a lot of degrees that never pay off.",
        167,
    ),
];

/// The fallback corpus as raw records, ready for the normal cleaning path.
pub fn fallback_opinions() -> Vec<RawOpinion> {
    SAMPLES
        .iter()
        .map(|&(text, score)| RawOpinion {
            text: text.to_string(),
            source: FALLBACK_SOURCE.to_string(),
            score,
        })
        .collect()
}
