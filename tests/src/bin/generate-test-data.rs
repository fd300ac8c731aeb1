//! Prints a comment file with random comments and replies, for trying out
//! hosts and the CLI on a well-populated forest

use chrono::Duration;
use marginalia_api::{Comment, CommentFile, Identity, Reply, Target, TIME_FORMAT};
use rand::{seq::SliceRandom, Rng};

const NUM_COMMENTS: usize = 30;
const MAX_REPLIES: usize = 5;
const COMMENT_WORD_COUNT: usize = 25;
const NUM_CELLS: usize = 12;

const USERS: &[(&str, &str)] = &[
    ("Ada", "#e6194b"),
    ("Grace", "#3cb44b"),
    ("Barbara", "#4363d8"),
    ("Frances", "#f58231"),
];

fn gen_identity(rng: &mut impl Rng) -> Identity {
    let (name, color) = USERS.choose(rng).expect("USERS is not empty");
    Identity::new(*name, *color)
}

fn gen_text(rng: &mut impl Rng) -> String {
    let words = rng.gen_range(1..COMMENT_WORD_COUNT);
    lipsum::lipsum_words_with_rng(&mut *rng, words)
}

fn gen_time(rng: &mut impl Rng, minutes_ago: i64) -> String {
    (chrono::Utc::now() - Duration::minutes(minutes_ago + rng.gen_range(0..60)))
        .format(TIME_FORMAT)
        .to_string()
}

fn gen_target(rng: &mut impl Rng) -> (&'static str, Target) {
    let cell = format!("cell-{}", rng.gen_range(0..NUM_CELLS));
    match rng.gen_range(0..3) {
        0 => ("document", Target::Null),
        1 => ("cell", serde_json::json!({ "cell_id": cell })),
        _ => {
            let line = rng.gen_range(0..5);
            (
                "cell-selection",
                serde_json::json!({
                    "cell_id": cell,
                    "start": { "line": line, "column": 0 },
                    "end": { "line": line, "column": 4 },
                    "offset": 0,
                    "anchor": "",
                }),
            )
        }
    }
}

fn main() {
    let mut rng = rand::thread_rng();
    let mut comments = Vec::with_capacity(NUM_COMMENTS);
    for i in 0..NUM_COMMENTS {
        // older comments first, as they would be in a real forest
        let minutes_ago = ((NUM_COMMENTS - i) * 120) as i64;
        let (kind, target) = gen_target(&mut rng);
        let mut c = Comment::new(kind, target, gen_text(&mut rng), gen_identity(&mut rng));
        c.time = gen_time(&mut rng, minutes_ago);
        for j in 0..rng.gen_range(0..=MAX_REPLIES) {
            let mut r = Reply::new(kind, gen_text(&mut rng), gen_identity(&mut rng));
            r.time = gen_time(&mut rng, minutes_ago - 10 * (j as i64 + 1));
            c.replies.push(r);
        }
        comments.push(c);
    }
    println!("{}", CommentFile::new(comments).to_json());
}
