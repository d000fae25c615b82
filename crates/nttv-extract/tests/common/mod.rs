#![allow(dead_code)]

use std::sync::Arc;

use nttv_core::types::{ChunkRecord, OutputFormat, Passage, Query};
use nttv_extract::{ExtractorRouter, Library, PassageInjector, Route};

pub const RANKS: &str = "\
9th Kyu
Striking: Zenpo Geri; Fudo Ken
Kihon Happo: Ichimonji no Kata
8th Kyu
Striking: Sokuho Geri; Koho Geri; Sakui Geri; Happo Geri; Kikaku Ken; Shuto Ken
Throws: Ganseki Nage
7th Kyu
Striking: Tobi Geri
";

pub const TECHNIQUES: &str = "\
name,japanese,translation,type,rank,in_rank,primary_focus,safety,partner_required,solo,tags,description
Omote Gyaku,表逆,Outside reverse,Joint Lock,8th Kyu,true,Wrist,Medium,true,false,wrist|lock,Outward wrist twist, taking the balance, then a takedown
Ura Gyaku,裏逆,Inside reverse,Joint Lock,8th Kyu,true,Wrist,Medium,true,false,wrist|lock,Inward wrist twist, elbow up
";

pub const LEADERSHIP: &str = "\
Togakure Ryu Ninpo Taijutsu - Masaaki Hatsumi
Gyokko Ryu Kosshijutsu - Ishizuka Tetsuji
Koto Ryu Koppojutsu - Sakasai Norio
";

pub const WEAPONS: &str = "\
[WEAPON] Kusari Fundo
ALIASES: weighted chain, kusari-fundo
TYPE: Flexible
RANKS: Introduced at 4th Kyu
";

pub const GLOSSARY: &str = "Glossary\nZanshin - Remaining mind; continued awareness\nShomen - Front of the dojo\n";

fn rec(source: &str, text: &str, priority: u8) -> ChunkRecord {
    ChunkRecord { text: text.to_string(), source: source.to_string(), page: None, priority }
}

pub fn records() -> Vec<ChunkRecord> {
    vec![
        rec("data/nttv rank requirements.txt", RANKS, 3),
        rec("data/Technique Descriptions.md", TECHNIQUES, 2),
        rec("data/Bujinkan Leadership and Wisdom.txt", LEADERSHIP, 2),
        rec("data/NTTV Weapons Reference.txt", WEAPONS, 2),
        rec("data/Glossary.txt", GLOSSARY, 2),
    ]
}

pub fn library() -> Arc<Library> {
    Arc::new(Library::from_records(&records()))
}

/// Every chunk as a retrieved passage, in corpus order.
pub fn retrieved() -> Vec<Passage> {
    records().iter().map(|r| Passage::retrieved(r, 0.3)).collect()
}

/// Inject then route, the way the orchestrator does.
pub fn ask(library: &Arc<Library>, question: &str) -> Route {
    let query = Query::new(question);
    let passages = PassageInjector::new(library.clone()).inject(&query, &retrieved());
    ExtractorRouter::new(library.clone(), OutputFormat::Bullets).route(&query, &passages)
}
