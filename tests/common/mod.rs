#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

pub const CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<ARTIKELSTAMM xmlns="http://elexis.ch/Elexis_Artikelstamm_v5" CREATION_DATETIME="2024-05-01T06:00:00" DATA_SOURCE="oddb2xml">
	<ITEMS>
		<ITEM PHARMATYPE="P">
			<GTIN>7680612345678</GTIN>
			<PHAR>1336630</PHAR>
			<DSCR>Dafalgan Tabl 500 mg 16 Stk</DSCR>
			<DEDUCTIBLE>10</DEDUCTIBLE>
		</ITEM>
		<ITEM PHARMATYPE="P">
			<GTIN>7680555555555</GTIN>
			<DSCR>Not on the list</DSCR>
			<DEDUCTIBLE>10</DEDUCTIBLE>
		</ITEM>
		<ITEM PHARMATYPE="N">
			<GTIN>7680444444444</GTIN>
			<DSCR>Listed but no deductible field</DSCR>
		</ITEM>
	</ITEMS>
</ARTIKELSTAMM>
"#;

pub fn zip_of(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Smallest .xlsx package calamine accepts: one sheet, inline-string cells.
pub fn xlsx_of(rows: &[&[&str]]) -> Vec<u8> {
    let mut sheet = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        sheet.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            let column = (b'A' + c as u8) as char;
            sheet.push_str(&format!(
                r#"<c r="{}{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                column,
                r + 1,
                value
            ));
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    zip_of(&[
        (
            "[Content_Types].xml",
            br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_vec(),
        ),
        (
            "_rels/.rels",
            br#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_vec(),
        ),
        (
            "xl/workbook.xml",
            br#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Publikationsliste" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_vec(),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            br#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_vec(),
        ),
        ("xl/worksheets/sheet1.xml", sheet.into_bytes()),
    ])
}

/// Archive holding a readme and `list.xlsx` with a header row and the given data rows.
pub fn publication_zip(data_rows: &[&[&str]]) -> Vec<u8> {
    let mut rows: Vec<&[&str]> = vec![&["GTIN", "Selbstbehalt 40%"]];
    rows.extend_from_slice(data_rows);
    zip_of(&[
        ("Liesmich.txt", b"BAG Publikation".to_vec()),
        ("list.xlsx", xlsx_of(&rows)),
    ])
}
