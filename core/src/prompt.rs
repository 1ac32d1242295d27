//! Prompt composition.
//!
//! The instruction prompt carries the classification rules of one scene; the
//! observation message carries the snapshot plus live counters. Threshold
//! arithmetic is evaluated here and handed to the classifier as finished
//! booleans, so the model only has to obey a flag.

use serde::{Deserialize, Serialize};

use crate::counters::{CounterSnapshot, whole_minutes};
use crate::scene::SceneDefinition;

const BASE_INSTRUCTION: &str = "请分析这张照片，判断用户的状态并给出反馈。";

/// One part of a multimodal user message, in the chat-completions wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Text block followed by the image payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationMessage {
    pub parts: Vec<ContentPart>,
}

impl ObservationMessage {
    /// The text block of the message.
    pub fn text(&self) -> &str {
        self.parts
            .iter()
            .find_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::ImageUrl { .. } => None,
            })
            .unwrap_or_default()
    }
}

fn line(out: &mut String, text: String) {
    out.push_str(&text);
    out.push('\n');
}

fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join("、")
}

/// Full rule document for one scene.
pub fn build_instruction_prompt(scene: &SceneDefinition) -> String {
    let name = &scene.name;
    let mut out = String::new();

    line(
        &mut out,
        format!(
            "你是 FocusEye，一个友善但严格的监督助手。你的任务是通过摄像头画面判断用户的{name}状态。"
        ),
    );
    out.push_str("\n## 判断规则\n\n");

    // (1) scene completeness precondition
    out.push_str("**场景完整性检查（必须先执行）**：\n");
    out.push_str("- 画面中必须能看到与场景相关的物品（书籍、作业本、笔、食物、电脑、平板、运动器械等）\n");
    out.push_str("- **如果只看到头像或人脸，看不到相关物品，一律判定为 distracted**\n");
    out.push_str("- **如果画面角度太近、太偏、太暗，无法确认场景，判定为 distracted**\n");
    out.push_str("- 只有同时满足\"人在专注\"和\"场景物品可见\"才能判定为 focused\n\n");

    // (2) focused
    out.push_str("**focused（专注）**：\n");
    line(&mut out, format!("- {}", scene.focused_desc));
    out.push_str("- 姿势端正，注意力集中\n");
    out.push_str("- **关键：画面中必须清晰可见相关物品**\n\n");

    // (3) posture, only where the scene asks for it
    if let Some(posture) = &scene.posture {
        out.push_str("**坐姿检查（重要）**：\n");
        line(&mut out, format!("即使用户在专注{name}，也要注意观察坐姿："));
        out.push_str("- 如果坐姿不规范（弯腰驼背、趴着、歪斜等），需要给予坐姿提醒\n");
        out.push_str("- 坐姿提醒时：status=\"focused\"（因为确实在专注），shouldSpeak=true（语音提醒坐姿）\n");
        line(&mut out, format!("- message示例：{}", quoted_list(&posture.examples)));
        out.push('\n');
    }

    // (4) distracted
    out.push_str("**distracted（分心）**：\n");
    line(&mut out, format!("- {}", scene.distracted_desc));
    out.push_str("- 东张西望、趴着、发呆\n");
    out.push_str("- 做与当前任务无关的事情\n");
    out.push_str("- **画面中只有头像，看不到相关物品**\n");
    out.push_str("- **画面角度不佳，无法判断是否在专注于任务**\n\n");

    // (5) away
    out.push_str("**away（离开）**：\n");
    out.push_str("- 画面中没有人\n");
    out.push_str("- 离开位置超过合理时间\n\n");

    // (6) feedback ladder; the rest rung outranks every other rung
    out.push_str("## 反馈策略（按顺序判断，第5条休息提醒优先级最高）\n\n");
    out.push_str("1. **正常专注且坐姿规范时**：仅输出文字反馈，**不进行语音播放** (shouldSpeak=false)\n");
    line(
        &mut out,
        format!(
            "   - message: 简短鼓励，如{}",
            quoted_list(&scene.examples.normal)
        ),
    );
    out.push_str("2. **连续专注达到里程碑时**：语音播放鼓励 (shouldSpeak=true)\n");
    out.push_str("   - 当\"是否达到鼓励里程碑\"为\"是\"时触发\n");
    line(
        &mut out,
        format!(
            "   - message: 热情鼓励并提及连续专注分钟数，如\"{}XX分钟了，继续加油！\"",
            scene.encourage_prefix
        ),
    );
    out.push_str("3. **分心时**：语音播放提醒 (shouldSpeak=true)\n");
    line(
        &mut out,
        format!(
            "   - message: 友善提醒，如{}",
            quoted_list(&scene.examples.distracted)
        ),
    );
    out.push_str("4. **离开时**：语音播放关心 (shouldSpeak=true)\n");
    line(
        &mut out,
        format!(
            "   - message: 关心询问，如{}",
            quoted_list(&scene.examples.away)
        ),
    );
    out.push_str("5. **累计专注需要休息时（优先级最高）**：语音播放休息提醒 (shouldSpeak=true)\n");
    out.push_str("   - 当\"是否需要休息提醒\"为\"是\"时触发，覆盖第2条：即使同时达到鼓励里程碑也只做休息提醒\n");
    line(
        &mut out,
        format!(
            "   - message: 温馨提醒，如\"{}，站起来活动5分钟吧！\"",
            scene.rest_prefix
        ),
    );
    if let Some(posture) = &scene.posture {
        out.push_str("6. **专注但坐姿不规范时**：语音播放坐姿提醒 (shouldSpeak=true)\n");
        out.push_str("   - status 设置为 \"focused\"（因为确实在专注）\n");
        let first = posture.examples.first().map(String::as_str).unwrap_or("注意坐姿");
        line(&mut out, format!("   - message: 坐姿提醒，如\"{first}\""));
    }

    // (7) output format
    out.push_str("\n## 输出要求\n\n");
    out.push_str("- 必须只返回一个 JSON 对象，不要输出其他内容\n");
    out.push_str("- message 不超过30字\n");
    out.push_str("- 语气亲切但不啰嗦，避免说教和重复\n");
    line(
        &mut out,
        format!(
            "- shouldSpeak: 在分心/离开/达到鼓励里程碑/需要休息{}时设置为 true",
            if scene.posture_check() { "/坐姿不规范" } else { "" }
        ),
    );
    out.push_str("\nJSON 字段：\n");
    out.push_str("- status (string，必填)：\"focused\"、\"distracted\" 或 \"away\"\n");
    out.push_str("- message (string，必填)：给用户的反馈文本\n");
    out.push_str("- confidence (number，0 到 1，默认 0.8)：判断的置信度\n");
    out.push_str("- shouldSpeak (boolean，默认 true)：是否需要语音播放\n");
    out.push_str(
        "\n示例：{\"status\": \"focused\", \"message\": \"很好，继续保持\", \"confidence\": 0.9, \"shouldSpeak\": false}\n",
    );

    out
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "是" } else { "否" }
}

/// Per-call user message: counters (when present) and the image.
///
/// Without counters the text degrades to the plain instruction.
pub fn build_observation_message(
    image_data_uri: &str,
    counters: Option<&CounterSnapshot>,
) -> ObservationMessage {
    let mut text = String::from(BASE_INSTRUCTION);
    if let Some(counters) = counters {
        text.push_str("\n\n");
        text.push_str(&render_counter_block(counters));
    }

    ObservationMessage {
        parts: vec![
            ContentPart::Text { text },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image_data_uri.to_string(),
                },
            },
        ],
    }
}

fn render_counter_block(c: &CounterSnapshot) -> String {
    let reached_rest = c.reached_rest();
    let reached_encouragement = c.reached_encouragement();
    let incremental_focus = whole_minutes(c.incremental_focus_minutes);
    let incremental_rest = whole_minutes(c.incremental_rest_minutes);
    let mut out = String::new();

    out.push_str("## 当前监督统计\n");
    line(&mut out, format!("- 检测次数: {} 次", c.check_count));
    line(&mut out, format!("- 运行时长: {}", c.running_time));
    line(
        &mut out,
        format!(
            "- 累计专注: {} ({} 分钟)",
            c.focus_time,
            whole_minutes(c.total_focus_minutes)
        ),
    );
    line(
        &mut out,
        format!(
            "- 连续专注: {} 分钟",
            whole_minutes(c.continuous_focus_minutes)
        ),
    );
    if !c.current_time.is_empty() {
        line(&mut out, format!("- 当前时间: {}", c.current_time));
    }

    out.push_str("\n### 鼓励判断\n");
    line(&mut out, format!("- 自上次鼓励后的连续专注: {incremental_focus} 分钟"));
    line(&mut out, format!("- 鼓励门槛: {} 分钟", c.encouragement_interval));
    line(
        &mut out,
        format!(
            "- 是否达到鼓励条件: {} ({} >= {})",
            yes_no(c.encouragement_threshold_met()),
            incremental_focus,
            c.encouragement_interval
        ),
    );
    line(
        &mut out,
        format!(
            "- 抑制鼓励: {}",
            if c.suppress_encouragement {
                "是（即将触发休息提醒，跳过本次鼓励）"
            } else {
                "否"
            }
        ),
    );
    line(&mut out, format!("- 是否达到鼓励里程碑: {}", yes_no(reached_encouragement)));

    out.push_str("\n### 休息提醒判断（优先级更高）\n");
    line(&mut out, format!("- 自上次休息提醒后的累计专注: {incremental_rest} 分钟"));
    line(&mut out, format!("- 休息提醒门槛: {} 分钟", c.rest_reminder_interval));
    line(
        &mut out,
        format!(
            "- 是否需要休息提醒: {} ({} >= {})",
            yes_no(reached_rest),
            incremental_rest,
            c.rest_reminder_interval
        ),
    );

    out.push_str("\n## 关键指令\n");
    if reached_rest {
        out.push_str("需要休息提醒！必须执行以下操作（优先级最高）：\n");
        out.push_str("1. status 设置为 \"focused\"\n");
        out.push_str("2. shouldSpeak 必须设置为 true（语音播放休息提醒）\n");
        line(
            &mut out,
            format!(
                "3. message 使用温馨的休息提醒，提及累计专注分钟数和建议休息时长，例如：\"已经累计专注{}分钟了，该休息一下啦，站起来活动5分钟吧！\"",
                whole_minutes(c.total_focus_minutes)
            ),
        );
    } else if reached_encouragement {
        out.push_str("已达到鼓励里程碑！必须执行以下操作：\n");
        out.push_str("1. status 设置为 \"focused\"\n");
        out.push_str("2. shouldSpeak 必须设置为 true（语音播放鼓励）\n");
        line(
            &mut out,
            format!(
                "3. message 使用热情的鼓励话语，提及连续专注分钟数，例如：\"太棒了！已经连续专注{}分钟了，继续保持！\"",
                whole_minutes(c.continuous_focus_minutes)
            ),
        );
    } else {
        out.push_str("未达到任何里程碑，正常判断即可。\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::{CounterInput, IntervalDefaults};
    use crate::scene::SceneCatalog;

    const IMAGE: &str = "data:image/jpeg;base64,/9j/4AAQ";

    fn counters(input: CounterInput) -> CounterSnapshot {
        input.resolve(&IntervalDefaults::default()).unwrap()
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("missing section {needle:?}"))
    }

    #[test]
    fn instruction_sections_appear_in_fixed_order() {
        let catalog = SceneCatalog::builtin().unwrap();
        let prompt = build_instruction_prompt(catalog.lookup("homework"));

        let order = [
            position(&prompt, "场景完整性检查"),
            position(&prompt, "**focused（专注）**"),
            position(&prompt, "坐姿检查"),
            position(&prompt, "**distracted（分心）**"),
            position(&prompt, "**away（离开）**"),
            position(&prompt, "## 反馈策略"),
            position(&prompt, "## 输出要求"),
        ];
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]), "{order:?}");
    }

    #[test]
    fn instruction_folds_in_scene_fragments() {
        let catalog = SceneCatalog::builtin().unwrap();
        let scene = catalog.lookup("eating");
        let prompt = build_instruction_prompt(scene);

        assert!(prompt.contains("专心吃饭状态"));
        assert!(prompt.contains(&scene.focused_desc));
        assert!(prompt.contains(&scene.distracted_desc));
        assert!(prompt.contains("\"饭菜要凉了\"、\"该回来吃饭了\"、\"食物还在等你呢\""));
        assert!(prompt.contains(&scene.encourage_prefix));
        assert!(prompt.contains(&scene.rest_prefix));
    }

    #[test]
    fn posture_clause_only_for_posture_scenes() {
        let catalog = SceneCatalog::builtin().unwrap();

        let reading = build_instruction_prompt(catalog.lookup("reading"));
        assert!(!reading.contains("坐姿检查"));
        assert!(!reading.contains("/坐姿不规范"));

        let computer = build_instruction_prompt(catalog.lookup("computer"));
        assert!(computer.contains("坐姿检查"));
        assert!(computer.contains("\"坐姿要端正哦\""));
        assert!(computer.contains("/坐姿不规范"));
    }

    #[test]
    fn rest_rule_is_marked_highest_priority() {
        let catalog = SceneCatalog::builtin().unwrap();
        let prompt = build_instruction_prompt(catalog.lookup("reading"));
        let ladder = &prompt[position(&prompt, "## 反馈策略")..position(&prompt, "## 输出要求")];
        let rest_rung = &ladder[position(ladder, "5. **累计专注需要休息时")..];
        assert!(rest_rung.contains("优先级最高"));
        assert!(rest_rung.contains("即使同时达到鼓励里程碑也只做休息提醒"));
        assert!(position(ladder, "1. **正常专注") < position(ladder, "4. **离开时"));
    }

    #[test]
    fn observation_without_counters_is_plain_instruction() {
        let message = build_observation_message(IMAGE, None);
        assert_eq!(message.text(), BASE_INSTRUCTION);
        assert_eq!(
            message.parts[1],
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: IMAGE.to_string()
                }
            }
        );
    }

    #[test]
    fn observation_lists_counters_and_flags() {
        let message = build_observation_message(
            IMAGE,
            Some(&counters(CounterInput {
                check_count: 7,
                running_time: "00:42:10".to_string(),
                total_focus_minutes: 38.0,
                continuous_focus_minutes: 12.5,
                incremental_focus_minutes: 12.5,
                incremental_rest_minutes: 1.0,
                ..CounterInput::default()
            })),
        );
        let text = message.text();
        assert!(text.contains("- 检测次数: 7 次"));
        assert!(text.contains("- 运行时长: 00:42:10"));
        assert!(text.contains("- 连续专注: 12 分钟"));
        assert!(text.contains("- 是否达到鼓励里程碑: 否"));
        assert!(text.contains("- 是否需要休息提醒: 否 (1 >= 3)"));
        assert!(text.contains("未达到任何里程碑"));
    }

    #[test]
    fn encouragement_imperative_when_only_encouragement_reached() {
        let message = build_observation_message(
            IMAGE,
            Some(&counters(CounterInput {
                continuous_focus_minutes: 25.0,
                incremental_focus_minutes: 25.0,
                ..CounterInput::default()
            })),
        );
        let text = message.text();
        assert!(text.contains("已达到鼓励里程碑！"));
        assert!(text.contains("已经连续专注25分钟了"));
        assert!(!text.contains("需要休息提醒！"));
    }

    #[test]
    fn rest_imperative_wins_when_both_reached() {
        let message = build_observation_message(
            IMAGE,
            Some(&counters(CounterInput {
                total_focus_minutes: 64.0,
                incremental_focus_minutes: 30.0,
                incremental_rest_minutes: 4.0,
                ..CounterInput::default()
            })),
        );
        let text = message.text();
        assert!(text.contains("需要休息提醒！"));
        assert!(text.contains("已经累计专注64分钟了"));
        assert!(!text.contains("已达到鼓励里程碑！"));
    }

    #[test]
    fn suppressed_encouragement_has_no_imperative() {
        let message = build_observation_message(
            IMAGE,
            Some(&counters(CounterInput {
                incremental_focus_minutes: 30.0,
                suppress_encouragement: true,
                ..CounterInput::default()
            })),
        );
        let text = message.text();
        assert!(text.contains("- 是否达到鼓励条件: 是 (30 >= 20)"));
        assert!(text.contains("- 抑制鼓励: 是"));
        assert!(text.contains("未达到任何里程碑"));
    }

    #[test]
    fn message_serializes_as_chat_content_parts() {
        let message = build_observation_message(IMAGE, None);
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value[0]["type"], "text");
        assert_eq!(value[1]["type"], "image_url");
        assert_eq!(value[1]["image_url"]["url"], IMAGE);
    }
}
