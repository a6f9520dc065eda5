use crate::runtime::ProgramError;

const BYTE_DIGITS: usize = 8;

pub(crate) fn parse_image(text: &str) -> Result<Vec<u8>, ProgramError> {
  let mut image = Vec::new();
  for (index, line) in text.lines().enumerate() {
    if !line.starts_with(['0', '1']) {
      continue;
    }
    let digits: String = line.chars().take(BYTE_DIGITS).collect();
    let byte = u8::from_str_radix(digits.trim_end(), 2).map_err(|_| ProgramError::InvalidByte {
      line: index + 1,
      text: line.to_string(),
    })?;
    image.push(byte);
  }
  Ok(image)
}
