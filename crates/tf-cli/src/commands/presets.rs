//! Presets command for listing session templates.

use std::io::Write;

use anyhow::Result;
use tf_core::Preset;
use tf_core::format::format_duration;
use tf_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let presets = db.list_presets()?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&presets)?)?;
        return Ok(());
    }
    format_presets(writer, &presets)
}

pub fn format_presets<W: Write>(writer: &mut W, presets: &[Preset]) -> Result<()> {
    for preset in presets {
        let essential = if preset.is_essential {
            "  (essential)"
        } else {
            ""
        };
        writeln!(
            writer,
            "{:<4}  {:>4}  {}{essential}",
            preset.id.as_str(),
            format_duration(preset.duration.get()),
            preset.name
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_seeded_presets() {
        let db = Database::open_in_memory().unwrap();
        let mut buf = Vec::new();
        run(&mut buf, &db, false).unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "p1      1h  沉浸工作\n\
             p2     30m  闲适时光\n\
             p3    1.5h  畅快游戏  (essential)\n\
             p4     20m  静心冥想  (essential)\n\
             p5     45m  自我提升  (essential)\n\
             p6     40m  燃脂运动\n"
        );
    }

    #[test]
    fn json_uses_camel_case() {
        let db = Database::open_in_memory().unwrap();
        let mut buf = Vec::new();
        run(&mut buf, &db, true).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[2]["id"], "p3");
        assert_eq!(value[2]["duration"], 90);
        assert_eq!(value[2]["isEssential"], true);
    }
}
