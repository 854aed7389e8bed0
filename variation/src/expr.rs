//! Arithmetic expressions used by `expr` variables and `${...}` placeholders.

use std::collections::HashMap;
use logos::Logos;
use crate::error::VarError;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp { Add, Sub, Mul, Div, Pow }

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(String),
    Neg(Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

const FUNCTIONS :&[(&str, usize)] = &[
    ("sin", 1), ("cos", 1), ("tan", 1), ("sqrt", 1), ("abs", 1), ("min", 2), ("max", 2),
];

pub fn tokenize(src :&str) -> Result<Vec<Token>, VarError> {
    let mut lex = Token::lexer(src);
    let mut tokens = Vec::new();
    while let Some(t) = lex.next() {
        match t {
            Ok(t) => tokens.push(t),
            Err(()) => return Err(VarError::Lex(lex.span().start, src.to_string())),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    src :&'a str,
    tokens :Vec<Token>,
    pos :usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn syntax(&self, msg :&str) -> VarError {
        VarError::Syntax(self.src.to_string(), msg.to_string())
    }

    fn expect(&mut self, t :Token, msg :&str) -> Result<(), VarError> {
        if self.next() == Some(t) { Ok(()) } else { Err(self.syntax(msg)) }
    }

    fn sum(&mut self) -> Result<Expr, VarError> {
        let mut lhs = self.product()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.product()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn product(&mut self) -> Result<Expr, VarError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, VarError> {
        if self.peek() == Some(&Token::Minus) {
            self.pos += 1;
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.power()
    }

    // right associative, binds tighter than unary minus on its left
    fn power(&mut self) -> Result<Expr, VarError> {
        let base = self.atom()?;
        if self.peek() == Some(&Token::Caret) {
            self.pos += 1;
            let exp = self.unary()?;
            return Ok(Expr::Bin(BinOp::Pow, Box::new(base), Box::new(exp)));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, VarError> {
        match self.next() {
            Some(Token::Number(x)) => Ok(Expr::Num(x)),
            Some(Token::LParen) => {
                let e = self.sum()?;
                self.expect(Token::RParen, "missing ')'")?;
                Ok(e)
            },
            Some(Token::Ident(name)) => {
                if self.peek() != Some(&Token::LParen) {
                    return Ok(Expr::Var(name));
                }
                self.pos += 1;
                let mut args = Vec::new();
                if self.peek() == Some(&Token::RParen) {
                    self.pos += 1;
                } else {
                    loop {
                        args.push(self.sum()?);
                        match self.next() {
                            Some(Token::Comma) => continue,
                            Some(Token::RParen) => break,
                            _ => return Err(self.syntax("expected ',' or ')' in argument list")),
                        }
                    }
                }
                match FUNCTIONS.iter().find(|(f, _)| *f == name) {
                    Some((_, n)) if *n == args.len() => Ok(Expr::Call(name, args)),
                    Some((_, n)) => Err(VarError::Arity(name, *n)),
                    None => Err(VarError::UnknownFunction(name)),
                }
            },
            Some(t) => Err(self.syntax(&format!("unexpected {:?}", t))),
            None => Err(self.syntax("unexpected end of expression")),
        }
    }
}

pub fn parse(src :&str) -> Result<Expr, VarError> {
    let mut p = Parser { src, tokens: tokenize(src)?, pos: 0 };
    let e = p.sum()?;
    if p.pos < p.tokens.len() {
        return Err(p.syntax("trailing input"));
    }
    Ok(e)
}

impl Expr {
    pub fn eval(&self, values :&HashMap<String, f64>) -> Result<f64, VarError> {
        Ok(match self {
            Expr::Num(x) => *x,
            Expr::Var(name) => match values.get(name) {
                Some(v) => *v,
                None if name == "pi" => std::f64::consts::PI,
                None => return Err(VarError::Unknown(name.clone())),
            },
            Expr::Neg(e) => -e.eval(values)?,
            Expr::Bin(op, a, b) => {
                let (a, b) = (a.eval(values)?, b.eval(values)?);
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Pow => a.powf(b),
                }
            },
            Expr::Call(f, args) => {
                let x = args[0].eval(values)?;
                match f.as_str() {
                    "sin" => x.sin(),
                    "cos" => x.cos(),
                    "tan" => x.tan(),
                    "sqrt" => x.sqrt(),
                    "abs" => x.abs(),
                    "min" => x.min(args[1].eval(values)?),
                    "max" => x.max(args[1].eval(values)?),
                    _ => return Err(VarError::UnknownFunction(f.clone())),
                }
            },
        })
    }

    /// Variables referenced by the expression, without the constant `pi`.
    pub fn vars(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out.sort();
        out.dedup();
        out
    }

    fn collect_vars(&self, out :&mut Vec<String>) {
        match self {
            Expr::Num(_) => {},
            Expr::Var(name) => if name != "pi" { out.push(name.clone()) },
            Expr::Neg(e) => e.collect_vars(out),
            Expr::Bin(_, a, b) => { a.collect_vars(out); b.collect_vars(out); },
            Expr::Call(_, args) => for a in args { a.collect_vars(out); },
        }
    }
}
