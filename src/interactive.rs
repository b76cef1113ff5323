use crate::error::Result;
use crate::template::{default_date, CertificateRequest, Roster, TemplateVariant};
use std::io::{self, BufRead, Write};

/// Fragt die Felder eines Zertifikats zeilenweise ab
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Liest eine Zeile
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut input = String::new();
        self.input.read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    /// Liest eine optionale Zeile (leer = None)
    fn read_optional_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let input = self.read_line(prompt)?;
        if input.is_empty() {
            Ok(None)
        } else {
            Ok(Some(input))
        }
    }

    /// Auswahl per Nummer aus `options`, leer = erster Eintrag
    fn choose(&mut self, prompt: &str, options: &[String]) -> io::Result<Option<usize>> {
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}. {}", i + 1, option)?;
        }
        let answer = self.read_line(prompt)?;
        if answer.is_empty() {
            return Ok(Some(0));
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => Ok(Some(n - 1)),
            _ => {
                writeln!(self.output, "❌ Invalid choice: {}", answer)?;
                Ok(None)
            }
        }
    }

    /// `None`, wenn die Eingabe abgebrochen wurde oder ungültig ist
    pub fn ask_request(&mut self, roster: &Roster) -> Result<Option<CertificateRequest>> {
        writeln!(self.output, "╔══════════════════════════════════════════════════════╗")?;
        writeln!(self.output, "║  📝 Onboarding certificate                           ║")?;
        writeln!(self.output, "╚══════════════════════════════════════════════════════╝")?;
        writeln!(self.output)?;

        let name = self.read_line("Employee name: ")?;
        if name.is_empty() {
            writeln!(self.output, "❌ Name must not be empty!")?;
            return Ok(None);
        }

        let today = default_date();
        let date = self
            .read_optional_line(&format!("Date [{}]: ", today))?
            .unwrap_or(today);

        writeln!(self.output)?;
        writeln!(self.output, "📋 Certificate type")?;
        let variants = TemplateVariant::all();
        let labels: Vec<String> = variants.iter().map(|v| v.label().to_string()).collect();
        let Some(choice) = self.choose("Choice [1]: ", &labels)? else {
            return Ok(None);
        };
        let mut request = CertificateRequest::new(name, date, variants[choice]);

        let names = roster.names();
        if names.is_empty() {
            writeln!(self.output, "⚠️  No roster loaded, the certificate stays unsigned.")?;
        } else {
            writeln!(self.output)?;
            writeln!(self.output, "✍️  Creator")?;
            let options: Vec<String> = names.iter().map(|n| n.to_string()).collect();
            let Some(choice) = self.choose("Choice [1]: ", &options)? else {
                return Ok(None);
            };
            request = request.with_creator(names[choice]);
        }

        Ok(Some(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::sample;
    use std::io::Cursor;

    fn ask(input: &str, roster: &Roster) -> (Option<CertificateRequest>, String) {
        let mut output = Vec::new();
        let request = Prompter::new(Cursor::new(input.as_bytes().to_vec()), &mut output)
            .ask_request(roster)
            .unwrap();
        (request, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_full_answers() {
        let roster = sample::roster().unwrap();
        let (request, _) = ask("Mario Rossi\n12-Dec-2025\n3\n2\n", &roster);

        let request = request.unwrap();
        assert_eq!(request.name, "Mario Rossi");
        assert_eq!(request.date, "12-Dec-2025");
        assert_eq!(request.variant, TemplateVariant::EasyMap);
        assert_eq!(request.creator.as_deref(), Some(sample::CO_SIGNER));
    }

    #[test]
    fn test_defaults_for_empty_answers() {
        let roster = sample::roster().unwrap();
        let (request, _) = ask("Max\n\n\n\n", &roster);

        let request = request.unwrap();
        assert_eq!(request.date, default_date());
        assert_eq!(request.variant, TemplateVariant::Monitoring2Signer);
        assert_eq!(request.creator.as_deref(), Some(sample::CREATOR));
    }

    #[test]
    fn test_empty_name_aborts() {
        let (request, output) = ask("\n", &Roster::default());
        assert!(request.is_none());
        assert!(output.contains("Name must not be empty"));
    }

    #[test]
    fn test_invalid_choice_aborts() {
        let (request, output) = ask("Max\n\n7\n", &Roster::default());
        assert!(request.is_none());
        assert!(output.contains("Invalid choice"));
    }

    #[test]
    fn test_without_roster_no_creator() {
        let (request, output) = ask("Max\n\n2\n", &Roster::default());
        assert!(request.unwrap().creator.is_none());
        assert!(output.contains("unsigned"));
    }
}
