//! Tests for the loot.xml rescale pass on realistic documents

use std::path::Path;

use rstest::rstest;

use lootscale::application::{rescale_loot_xml, InvalidCountPolicy, RescaledDocument};
use lootscale::domain::Multiplier;

const LOOT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- feel loot pallets -->
<lootcontainers>
	<lootcontainer name="palletAmmo" count="1" size="6,4" sound_open="UseActions/open_garbage" loot_quality_template="qualBaseTemplate">
		<item name="ammo9mmBulletBall" count="30,40"/>
		<item name="ammo762mmBulletBall" count='20,30' prob="0.5"/>
		<item group="groupAmmoRare"/>
		<block name="cntWoodBox" count="5"/>
	</lootcontainer>
	<lootcontainer name="palletFood" size="4,4">
		<item name="foodCanChili" count="3"/>
		<item name="drinkJarBoiledWater" count=""/>
	</lootcontainer>
	<lootgroup name="groupAmmoRare">
		<item name="ammo44MagnumBulletAP" count="12"/>
	</lootgroup>
</lootcontainers>
"#;

fn rescale(xml: &str, factor: f64) -> RescaledDocument {
    rescale_loot_xml(
        xml,
        Path::new("Config/loot.xml"),
        Multiplier::new(factor).unwrap(),
        InvalidCountPolicy::Abort,
    )
    .expect("rescale")
}

#[test]
fn given_mod_loot_file_when_doubling_then_only_container_children_change() {
    let doc = rescale(LOOT_XML, 2.0);

    let expected = LOOT_XML
        .replace(
            r#"<item name="ammo9mmBulletBall" count="30,40"/>"#,
            r#"<item name="ammo9mmBulletBall" count="60,80"/>"#,
        )
        .replace(
            r#"<item name="ammo762mmBulletBall" count='20,30' prob="0.5"/>"#,
            r#"<item name="ammo762mmBulletBall" count="40,60" prob="0.5"/>"#,
        )
        .replace(
            r#"<block name="cntWoodBox" count="5"/>"#,
            r#"<block name="cntWoodBox" count="10"/>"#,
        )
        .replace(
            r#"<item name="foodCanChili" count="3"/>"#,
            r#"<item name="foodCanChili" count="6"/>"#,
        );
    assert_eq!(doc.xml, expected);
    assert_eq!(doc.stats.containers, 2);
    assert_eq!(doc.stats.items, 3);
    assert_eq!(doc.stats.blocks, 1);
}

#[test]
fn given_container_count_attribute_when_rescaling_then_container_itself_untouched() {
    let doc = rescale(LOOT_XML, 2.0);
    assert!(doc.xml.contains(r#"<lootcontainer name="palletAmmo" count="1" size="6,4""#));
}

#[test]
fn given_lootgroup_item_when_rescaling_then_untouched() {
    let doc = rescale(LOOT_XML, 2.0);
    assert!(doc
        .xml
        .contains(r#"<item name="ammo44MagnumBulletAP" count="12"/>"#));
}

#[test]
fn given_unit_multiplier_when_rescaling_then_document_unchanged() {
    let doc = rescale(LOOT_XML, 1.0);
    assert_eq!(doc.xml, LOOT_XML.replace("count='20,30'", r#"count="20,30""#));
}

#[test]
fn given_leading_bom_when_rescaling_at_unit_multiplier_then_byte_identical() {
    let xml = "\u{feff}<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<lootcontainers><lootcontainer><item count=\"3\"/></lootcontainer></lootcontainers>";

    let doc = rescale(xml, 1.0);

    assert_eq!(doc.xml.as_bytes(), xml.as_bytes());
}

#[test]
fn given_leading_bom_when_doubling_then_bom_kept_and_counts_scaled() {
    let xml = "\u{feff}<lootcontainers><lootcontainer><item count=\"3\"/></lootcontainer></lootcontainers>";

    let doc = rescale(xml, 2.0);

    assert!(doc.xml.starts_with('\u{feff}'));
    assert_eq!(doc.xml.matches('\u{feff}').count(), 1);
    assert!(doc.xml.contains(r#"<item count="6"/>"#));
}

#[test]
fn given_declaration_and_comment_when_rescaling_then_preserved() {
    let doc = rescale(LOOT_XML, 0.5);
    assert!(doc
        .xml
        .starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- feel loot pallets -->\n"));
}

#[test]
fn given_container_as_root_when_rescaling_then_children_scaled() {
    let doc = rescale(r#"<lootcontainer><item count="4"/></lootcontainer>"#, 0.5);
    assert_eq!(doc.xml, r#"<lootcontainer><item count="2"/></lootcontainer>"#);
}

#[test]
fn given_nested_containers_when_rescaling_then_each_scales_its_own_children() {
    let doc = rescale(
        r#"<lootcontainer><item count="1"/><lootcontainer><block count="2"/></lootcontainer></lootcontainer>"#,
        3.0,
    );
    assert_eq!(
        doc.xml,
        r#"<lootcontainer><item count="3"/><lootcontainer><block count="6"/></lootcontainer></lootcontainer>"#
    );
    assert_eq!(doc.stats.containers, 2);
}

#[test]
fn given_item_with_start_and_end_tags_when_rescaling_then_scaled() {
    let doc = rescale(
        r#"<lootcontainer><item count="7"></item></lootcontainer>"#,
        2.0,
    );
    assert_eq!(
        doc.xml,
        r#"<lootcontainer><item count="14"></item></lootcontainer>"#
    );
}

#[rstest]
#[case("10", 2.0, "20")]
#[case("5", 1.5, "7")]
#[case("3", 0.3, "0")]
#[case("10", 1.1, "11")]
#[case("7", -1.5, "-10")]
#[case("30,40", 1.5, "45,60")]
#[case("30,40", 0.0, "0,0")]
#[case("1,3", 0.5, "0,1")]
#[case("-4,4", 0.75, "-3,3")]
fn given_item_count_when_rescaling_then_truncates_toward_zero(
    #[case] count: &str,
    #[case] factor: f64,
    #[case] expected: &str,
) {
    let doc = rescale(
        &format!(r#"<lootcontainer><item count="{count}"/></lootcontainer>"#),
        factor,
    );
    assert_eq!(
        doc.xml,
        format!(r#"<lootcontainer><item count="{expected}"/></lootcontainer>"#)
    );
}

#[test]
fn given_block_range_when_rescaling_then_rejected() {
    let result = rescale_loot_xml(
        r#"<lootcontainer><block count="1,2"/></lootcontainer>"#,
        Path::new("loot.xml"),
        Multiplier::new(2.0).unwrap(),
        InvalidCountPolicy::Abort,
    );
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("block counts cannot be ranges"));
}
