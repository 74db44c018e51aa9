// Ogg page checksum
//
// CRC-32 with polynomial 0x04c11db7, initial value 0, no reflection
// and no final xor. The checksum field is zero while it is computed.

const POLYNOMIAL: u32 = 0x04c1_1db7;

static CRC_TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut r = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            r = if r & 0x8000_0000 != 0 {
                (r << 1) ^ POLYNOMIAL
            } else {
                r << 1
            };
            bit += 1;
        }
        table[i] = r;
        i += 1;
    }
    table
}

/// Continue a checksum over `data`
pub fn update(crc: u32, data: &[u8]) -> u32 {
    data.iter().fold(crc, |crc, &byte| {
        (crc << 8) ^ CRC_TABLE[(((crc >> 24) as u8) ^ byte) as usize]
    })
}

/// Checksum of a full serialized page, treating the checksum field as zero
pub fn page_checksum(page: &[u8]) -> u32 {
    use super::OGG_CRC_OFFSET;

    if page.len() < OGG_CRC_OFFSET + 4 {
        return update(0, page);
    }
    let crc = update(0, &page[..OGG_CRC_OFFSET]);
    let crc = update(crc, &[0u8; 4]);
    update(crc, &page[OGG_CRC_OFFSET + 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_reference_entries() {
        assert_eq!(CRC_TABLE[0], 0);
        assert_eq!(CRC_TABLE[1], 0x04c1_1db7);
        assert_eq!(CRC_TABLE[255], 0xb1f7_40b4);
    }

    #[test]
    fn checksum_ignores_stored_field() {
        let mut page = vec![0u8; 40];
        page[..4].copy_from_slice(b"OggS");
        page[30] = 0x42;
        let expected = page_checksum(&page);

        page[22..26].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(page_checksum(&page), expected);
    }

    #[test]
    fn checksum_is_sensitive_to_payload() {
        let a = [b'O', b'g', b'g', b'S', 0, 2];
        let b = [b'O', b'g', b'g', b'S', 0, 4];
        assert_ne!(update(0, &a), update(0, &b));
    }
}
