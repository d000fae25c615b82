//! Dojo etiquette. The curriculum states these as fixed expectations, so
//! the answers are canned rather than read from passages.

use nttv_core::traits::Extractor;
use nttv_core::types::{Passage, Query};

const BOW_IN_TEXT: &str = "\
Bow-in procedure (as taught in this curriculum) includes:
- Arriving with enough time to be on the mat and ready when class begins.
- Lining up in rank order facing the front (shomen) of the dojo.
- Bowing together toward the shomen, then toward the instructor, and then toward your training partners.
- Using dojo phrases like “Onegaishimasu” at the start (“please train with me”) and “Domo arigato gozaimashita” at the end (“thank you very much”).
The exact form can vary by dojo, but you should be able to participate smoothly and respectfully.";

const BOW_LATE_TEXT: &str = "\
Bowing in late (dojo etiquette):
- If you arrive late, wait at the edge of the mat until the instructor acknowledges you.
- When given permission, bow toward the shomen and the instructor before stepping onto the mat.
- Join the line or your training partner quietly without disrupting ongoing practice.
- After class, apologize briefly if needed. The main point is to show respect and minimize disruption.";

const DOJO_JAPANESE_TEXT: &str = "\
Basic dojo Japanese for this curriculum (9th Kyu):
- Onegaishimasu: “Please assist me” (said at the start of training or paired practice).
- Domo arigato gozaimashita: “Thank you very much” (often at the end of class).
- Shiken Haramitsu Daikomyo: “Through every encounter, may we be brought to the highest light.”
- Yame: “Stop.”
- Counting from 1 to 10 in Japanese: ichi, ni, san, yon/shi, go, roku, nana/shichi, hachi, kyuu/ku, juu.
These phrases and counting are part of basic dojo etiquette and should be used sincerely, not mechanically.";

const COUNTING_TEXT: &str = "\
Counting from 1 to 10 in Japanese (as used in class):
1: ichi (いち)
2: ni (に)
3: san (さん)
4: yon / shi (よん / し)
5: go (ご)
6: roku (ろく)
7: nana / shichi (なな / しち)
8: hachi (はち)
9: kyuu / ku (きゅう / く)
10: juu (じゅう)
You will often hear these used to count reps during basics, ukemi, or conditioning drills.";

const ZANSHIN_BEGINNER_TEXT: &str = "\
Zanshin (awareness) at the beginner level in this curriculum includes:
- Keep your mouth closed: stay focused, avoid unnecessary talking.
- Keep your hands up: maintain a ready, protective posture even between drills.
- Know who Masaaki Hatsumi is: the Soke (grandmaster) of Bujinkan Budo Taijutsu.
- Know who Toshitsugu Takamatsu was: Hatsumi’s teacher and previous generation master.
This form of zanshin is about basic awareness and readiness in the dojo.";

const ZANSHIN_ADVANCED_TEXT: &str = "\
Zanshin (awareness) at higher levels in this curriculum adds:
- Being able to perform techniques without directly staring at the opponent.
- Training with one eye closed, both eyes closed, blindfolded, or under reduced vision.
- Learning to feel timing, distance, and movement through peripheral cues, contact, and intent.
- Noticing objects, people, and conditions in your environment even when you are focused on a technique.
This advanced zanshin is about expanding awareness beyond the immediate target so you can move safely and effectively.";

const NINTH_KYU_ETIQUETTE_TEXT: &str = "\
Dojo etiquette at 9th Kyu in this curriculum includes:
- Learning the bow-in procedure so you can line up, bow to shomen, bow to the instructor, and bow to your training partners correctly.
- Knowing how to bow in respectfully if you arrive late to class.
- Using basic dojo Japanese phrases such as “Onegaishimasu”, “Domo arigato gozaimashita”, “Shiken Haramitsu Daikomyo”, and “Yame”, and being able to count from 1 to 10 in Japanese during drills.
- Practicing basic zanshin (awareness): keeping your mouth closed, hands up, and knowing who Hatsumi and Takamatsu are in the Bujinkan lineage.
These are foundation-level etiquette skills expected of a new Bujinkan student.";

const SUMMARY_TEXT: &str = "This curriculum expects you to understand basic dojo etiquette: how to bow in, how to bow in late without disrupting class, how to use key Japanese phrases like “Onegaishimasu” and “Domo arigato gozaimashita”, how to count from 1 to 10 in Japanese during drills, and how to maintain zanshin (awareness) in the dojo.";

const TRIGGERS: &[&str] = &[
    "etiquette",
    "bow in",
    "bowing in",
    "bow-in",
    "zanshin",
    "dojo japanese",
    "japanese phrases",
    "late to class",
    "arrive late",
    "coming in late",
    "count in japanese",
    "japanese numbers",
];

pub struct Etiquette;

impl Etiquette {
    fn answer(q: &str) -> String {
        let bow_in = q.contains("bow in") || q.contains("bow-in") || q.contains("bowing in");
        if (q.contains("bow") && q.contains("late")) || q.contains("arrive late") || q.contains("coming in late") {
            return BOW_LATE_TEXT.to_string();
        }
        if bow_in {
            return BOW_IN_TEXT.to_string();
        }
        if ((q.contains("count") || q.contains("numbers")) && q.contains("japanese")) || q.contains("japanese numbers") {
            return COUNTING_TEXT.to_string();
        }
        if q.contains("dojo japanese") || q.contains("japanese phrases") {
            return DOJO_JAPANESE_TEXT.to_string();
        }
        if q.contains("zanshin") {
            if q.contains("advanced") || q.contains("higher level") {
                return ZANSHIN_ADVANCED_TEXT.to_string();
            }
            return format!("{ZANSHIN_BEGINNER_TEXT}\n\n{ZANSHIN_ADVANCED_TEXT}");
        }
        if q.contains("etiquette") {
            return NINTH_KYU_ETIQUETTE_TEXT.to_string();
        }
        SUMMARY_TEXT.to_string()
    }
}

impl Extractor for Etiquette {
    fn name(&self) -> &'static str {
        "etiquette"
    }

    fn try_answer(&self, query: &Query, _passages: &[Passage]) -> Option<String> {
        let q = query.folded();
        if !TRIGGERS.iter().any(|t| q.contains(t)) {
            return None;
        }
        Some(Self::answer(q))
    }
}
